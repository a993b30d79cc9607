use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // An optional config path may be given as the only argument.
    let config_path = env::args().nth(1);
    vecsql_server::start(config_path.as_deref()).await
}
