fn main() -> anyhow::Result<()> {
    mtrmeter_app::mtrmeter()
}
