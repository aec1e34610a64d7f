use std::env;

#[tokio::main]
async fn main() {
    let raw_args: Vec<String> = env::args().collect();
    match raw_args.get(1).map(|s| s.as_str()) {
        Some("serve") => {
            let port = raw_args
                .get(2)
                .and_then(|s| s.parse::<u16>().ok())
                .unwrap_or(8080);
            if let Err(e) = nestegg::api::run_http_server(port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Some("calc") => match nestegg::api::run_calc(raw_args[2..].iter().cloned()) {
            Ok(json) => println!("{json}"),
            Err(msg) => {
                eprintln!("{msg}");
                std::process::exit(2);
            }
        },
        _ => {
            eprintln!("Usage: cargo run -- serve [port]");
            eprintln!("       cargo run -- calc --help");
            std::process::exit(1);
        }
    }
}
