use std::time::Duration;

use tiered_config::{Specification, TieredConfig, describe};

#[derive(Debug, Default, TieredConfig)]
#[tiered_config(prefix = "APP")]
struct AppConfig {
    #[tiered_config(env, flag, default = "localhost")]
    host: String,
    #[tiered_config(env, flag, default = 8080u16, required)]
    port: u16,
    #[tiered_config(env = "TIMEOUT", default = "1m 30s")]
    request_timeout: Duration,
    #[tiered_config(flag = "dry-run")]
    dry_run: bool,
    #[tiered_config(env, secret = "projects/p/secrets/token/versions/1")]
    token: Option<String>,
    #[tiered_config(default = -1.5)]
    bias: f32,
    #[tiered_config(skip)]
    scratch: Vec<u8>,
    untouched: i64,
}

fn main() {
    let _: &str = <AppConfig as TieredConfig>::prefix();
    let mut config = AppConfig::default();
    let _fields = describe(&mut config);
    let _ = config.fields().len();
}
