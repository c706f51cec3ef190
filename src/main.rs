fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    puzzles::cli::run()
}
