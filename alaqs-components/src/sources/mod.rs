//! Source modules
//!
//! Each module owns a store of sources, opened when its job begins, and turns the
//! activity of those sources over an interval into emissions.
//!
//! - `area`, `point`, `parking`, `roadway`: sources with annual activity spread over
//!   time by a temporal profile (see [`profiled`])
//! - `movement`: aircraft movements flying the LTO cycle

pub(crate) fn enabled() -> bool {
    true
}

/// Declares a module over a [`alaqs_core::store::SourceStore`] whose calculation is
/// provided by a [`profiled::ActivityBasis`] implementation.
///
/// The generated struct serialises as `{ type, store_path, enable }`. The macro is in
/// textual scope for the submodules declared below it.
macro_rules! profiled_source_module {
    ($(#[$meta:meta])* $module:ident, $name:literal) => {
        $(#[$meta])*
        #[derive(Debug, serde::Serialize, serde::Deserialize)]
        pub struct $module {
            #[serde(default)]
            pub store_path: Option<std::path::PathBuf>,
            #[serde(default = "crate::sources::enabled")]
            pub enable: bool,
            #[serde(skip)]
            job: alaqs_core::module::JobState<alaqs_core::store::SourceStore>,
        }

        impl $module {
            pub const NAME: &'static str = $name;

            /// Module reading its sources from a TOML store when the job begins
            pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
                Self {
                    store_path: Some(path.into()),
                    enable: true,
                    job: alaqs_core::module::JobState::default(),
                }
            }

            /// Module using an already loaded store
            pub fn with_store(store: alaqs_core::store::SourceStore) -> Self {
                Self {
                    store_path: None,
                    enable: true,
                    job: alaqs_core::module::JobState::with_store(store),
                }
            }
        }

        #[typetag::serde]
        impl alaqs_core::module::SourceModule for $module {
            fn name(&self) -> &str {
                Self::NAME
            }

            fn is_enabled(&self) -> bool {
                self.enable
            }

            fn state(&self) -> alaqs_core::module::ModuleState {
                self.job.state()
            }

            fn begin_job(&mut self) -> alaqs_core::errors::AlaqsResult<()> {
                let path = self.store_path.clone();
                self.job.begin(Self::NAME, || match path {
                    Some(path) => alaqs_core::store::SourceStore::open(&path),
                    None => Err(alaqs_core::errors::AlaqsError::Configuration(format!(
                        "{} has no store_path",
                        Self::NAME
                    ))),
                })
            }

            fn process(
                &self,
                start: chrono::NaiveDateTime,
                end: chrono::NaiveDateTime,
                filter: &alaqs_core::module::SourceFilter,
            ) -> alaqs_core::errors::AlaqsResult<alaqs_core::module::ProcessOutput> {
                let store = self.job.store(Self::NAME)?;
                crate::sources::profiled::process_profiled(self, store, start, end, filter)
            }

            fn end_job(&mut self) {
                self.job.end(Self::NAME);
            }
        }
    };
}

pub mod area;
pub mod movement;
pub mod parking;
pub mod point;
pub mod profiled;
pub mod roadway;

pub use area::AreaSourceModule;
pub use movement::MovementSourceModule;
pub use parking::ParkingSourceModule;
pub use point::PointSourceModule;
pub use roadway::RoadwaySourceModule;
