fn main() -> anyhow::Result<()> {
    brrtmvc::cli::run_cli()
}
