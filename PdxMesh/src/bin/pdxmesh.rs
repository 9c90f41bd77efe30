fn main() -> anyhow::Result<()> {
    pdxmesh::cli::run_cli()
}
