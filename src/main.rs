#[tokio::main]
async fn main() {
    if let Err(e) = around::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
