fn main() -> anyhow::Result<()> {
    foodrescue::cli::run()
}
