fn main() -> anyhow::Result<()> {
    limb_scan::internal_main()
}
