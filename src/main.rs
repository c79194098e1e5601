#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = paperbank::run().await {
        eprintln!("paperbank fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
