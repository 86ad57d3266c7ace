fn main() -> anyhow::Result<()> {
    ai_history_search::cli::run()
}
