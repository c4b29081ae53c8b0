use tiered_config::{ConfigValue, TieredConfig};

#[derive(Default, TieredConfig)]
struct Limits<T>
where
    T: ConfigValue + Default,
{
    #[tiered_config(env, flag, default = 10)]
    limit: T,
}

fn main() {
    let _ = Limits::<u32>::load_from_iter(["limits"]);
}
