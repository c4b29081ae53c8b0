use tiered_config::TieredConfig;

/// Uses the real crate name as a self-referential alias so no workspace
/// reconfiguration is needed.
#[derive(Debug, Default, TieredConfig)]
#[tiered_config(crate = "tiered_config", prefix = "ALIAS_")]
struct AliasConfig {
    #[tiered_config(env)]
    value: String,
}

fn main() {
    let result: tiered_config::TieredResult<AliasConfig> =
        AliasConfig::load_from_iter(["alias"]);
    drop(result);
}
