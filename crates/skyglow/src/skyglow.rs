pub struct Skyglow {}

static SKYGLOW_STATIC: std::sync::OnceLock<SkyglowStatic> = std::sync::OnceLock::new();

struct SkyglowStatic {}

impl SkyglowStatic {
    fn init(app_name: &str) -> &'static Self {
        SKYGLOW_STATIC.get_or_init(|| {
            env_logger::builder()
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .init();

            log::info!("Starting {}.", app_name);

            Self {}
        })
    }
}

impl Skyglow {
    /// Process wide setup, only the first call initializes logging.
    pub fn new(app_name: &str) -> Self {
        SkyglowStatic::init(app_name);

        Self {}
    }

    pub fn enable_profiling(&self, enabled: bool) {
        skyglow_profiling::set_enabled(enabled);
    }
}
