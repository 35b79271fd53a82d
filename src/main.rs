#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    laporan_guru_bertugas::run().await
}
