#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = rendir_rust::run().await {
        eprintln!("rendir-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
