fn main() -> anyhow::Result<()> {
    treerouter::cli::run_cli()
}
