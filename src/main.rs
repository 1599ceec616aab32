use oio_http::{Body, ClientConfig, Method};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: oio-http <host[:port]> <METHOD> <path> [query]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [host, method, path, rest @ ..] = args.as_slice() else {
        anyhow::bail!(USAGE);
    };
    let query = rest.first().map(String::as_str);
    let method: Method = method.parse()?;

    let cfg = ClientConfig::load();

    tokio::select! {
        res = oio_http::http::connection::request_with(&cfg, host, method, path, None, query, Body::Empty) => {
            let (response, body) = res?;
            println!("{} {} {}", response.version(), response.status(), response.reason());
            for (name, value) in response.headers().lines() {
                println!("{name}: {value}");
            }
            println!();
            println!("({} body bytes)", body.len());
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Interrupted");
        }
    }

    Ok(())
}
