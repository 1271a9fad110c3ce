fn main() -> anyhow::Result<()> {
    synthwave::run()
}
