fn main() -> anyhow::Result<()> {
    vgsweep::cli::main()
}
