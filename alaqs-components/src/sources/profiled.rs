//! Calculation shared by sources with a temporal profile.
//!
//! For each selected source the annual activity $A$ is spread over the interval
//! $[t_0, t_1)$ with its temporal profile (see
//! [`TemporalProfile::activity_multiplier`](alaqs_core::profile::TemporalProfile::activity_multiplier)),
//! scaled by a module specific factor $s$ and applied to every factor $f_p$ of the
//! source's emission index:
//!
//! $$ E_p = f_p \cdot c_{unit} \cdot s \cdot \sum_{h \in [t_0, t_1)} A \frac{w_h w_d w_m}{N(year)} $$
//!
//! where $c_{unit}$ converts the index unit to kilograms.

use alaqs_core::emission::Emission;
use alaqs_core::emission_index::IndexUnit;
use alaqs_core::errors::{AlaqsError, AlaqsResult};
use alaqs_core::module::{DiagnosticKind, ProcessOutput, SourceEmissions, SourceFilter, SourceRef};
use alaqs_core::source::Source;
use alaqs_core::store::SourceStore;
use chrono::NaiveDateTime;
use tracing::debug;

/// How a module turns a source's profiled activity into the multiplier of its
/// emission index.
pub trait ActivityBasis {
    fn module_name(&self) -> &str;

    /// Unit the emission indices of this module's sources must be declared in
    fn unit(&self) -> IndexUnit;

    /// Factor applied on top of the profiled activity
    ///
    /// A source that cannot be scaled is skipped and the returned diagnostic reported.
    fn scale(&self, _source: &Source) -> Result<f64, DiagnosticKind> {
        Ok(1.0)
    }
}

/// Emissions of every selected source in `store` over `[start, end)`.
///
/// Problems with individual sources are reported as diagnostics and never stop the
/// remaining sources from being processed.
pub fn process_profiled<B: ActivityBasis + ?Sized>(
    basis: &B,
    store: &SourceStore,
    start: NaiveDateTime,
    end: NaiveDateTime,
    filter: &SourceFilter,
) -> AlaqsResult<ProcessOutput> {
    if end <= start {
        return Err(AlaqsError::InvalidInterval {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let name = basis.module_name();
    let (selected, missing) = filter.select(store.iter());

    let mut output = ProcessOutput {
        unmatched: missing,
        ..ProcessOutput::default()
    };

    for source in selected {
        let index = &source.emission_index;
        if index.unit != basis.unit() {
            let kind = DiagnosticKind::UnitMismatch {
                expected: basis.unit(),
                found: index.unit,
            };
            output.report(name, &source.id, start, kind);
            continue;
        }

        let scale = match basis.scale(source) {
            Ok(scale) => scale,
            Err(kind) => {
                output.report(name, &source.id, start, kind);
                continue;
            }
        };

        let activity = match source
            .profile
            .activity_multiplier(source.units_per_year, start, end)
        {
            Ok(activity) => activity,
            Err(e) => {
                output.report(name, &source.id, start, DiagnosticKind::Calculation(e));
                continue;
            }
        };

        let mut emission = Emission::with_geometry(source.geometry_text.clone());
        let report = emission.add_generic(&index.factors, activity * scale, index.unit);
        output.report_accumulation(name, &source.id, start, report);

        output.records.push(SourceEmissions {
            timestamp: start,
            source: SourceRef::Source(source.clone()),
            emissions: vec![emission],
        });
    }

    debug!(
        module = name,
        %start,
        %end,
        sources = output.records.len(),
        "processed interval"
    );
    Ok(output)
}
