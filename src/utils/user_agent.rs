/// User agent sent with every pool request, e.g. `gbt-miner/2.0.0 (linux)`.
pub fn user_agent() -> String {
    format!(
        "gbt-miner/{} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}
