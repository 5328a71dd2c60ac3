// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Profiling binary for the orasql-transform pipeline.
//!
//! # Usage
//!
//! ## DHAT heap profiling
//! ```bash
//! cargo build --release --features dhat-heap
//! ./target/release/orasql_transform_profile --single --units all
//! ```
//!
//! ## Flamegraph
//! ```bash
//! cargo flamegraph --release -- --iterations 1000 --mode transform
//! ```
//!
//! ## Samply
//! ```bash
//! cargo build --release
//! samply record ./target/release/orasql_transform_profile --iterations 1000
//! ```

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use clap::Parser as ClapParser;
use orasql_transform::config::TransformConfig;
use orasql_transform::metadata::MetadataIndex;
use orasql_transform::qualified_name::QualifiedName;
use orasql_transform::store::RoutineStore;
use orasql_transform::{segment_and_store, transform_routine, SourceUnit};

mod samples;

use samples::{get_units, SampleSet, Unit};

#[derive(ClapParser)]
#[command(name = "orasql_transform_profile")]
#[command(about = "Profile the orasql-transform cleaner/scanner/parser/visitor pipeline")]
struct Args {
    /// Number of iterations (for CPU profiling)
    #[arg(short, long, default_value = "100")]
    iterations: usize,

    /// Mode: "segment", "transform", or "both"
    #[arg(short, long, default_value = "both")]
    mode: String,

    /// Unit set: "cursors", "dml", "exceptions", or "all"
    #[arg(short, long, default_value = "all")]
    units: String,

    /// Single iteration mode (for DHAT/heap profiling)
    #[arg(long)]
    single: bool,

    /// Print timing information
    #[arg(long)]
    timing: bool,
}

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let args = Args::parse();

    let unit_set = SampleSet::from_str(&args.units).unwrap_or_else(|| {
        eprintln!(
            "Unknown unit set '{}', using 'all'. Options: cursors, dml, exceptions, all",
            args.units
        );
        SampleSet::All
    });

    let units = get_units(unit_set);
    let iterations = if args.single { 1 } else { args.iterations };

    eprintln!("Profiling {} package bodies, {} iterations", units.len(), iterations);
    eprintln!("Mode: {}", args.mode);

    let start = std::time::Instant::now();

    for i in 0..iterations {
        if args.timing && i > 0 && i % 100 == 0 {
            eprintln!("  Iteration {}/{}", i, iterations);
        }

        for unit in &units {
            match args.mode.as_str() {
                "segment" => {
                    profile_segment(unit);
                }
                "transform" => {
                    profile_transform(unit);
                }
                "both" => {
                    profile_segment(unit);
                    profile_transform(unit);
                }
                _ => {
                    eprintln!("Unknown mode '{}', using 'both'", args.mode);
                    profile_segment(unit);
                    profile_transform(unit);
                }
            }
        }
    }

    let elapsed = start.elapsed();

    if args.timing {
        eprintln!("\nCompleted {} iterations in {:?}", iterations, elapsed);
        eprintln!("Average per iteration: {:?}", elapsed / iterations as u32);
        let total_units = units.len() * iterations;
        eprintln!(
            "Total units processed: {}, avg per unit: {:?}",
            total_units,
            elapsed / total_units as u32
        );
    }

    eprintln!("Done.");
}

/// Profile cleaner -> scanner -> stub/reducer - kept as a separate function
/// for clear flamegraph boundaries.
#[inline(never)]
fn profile_segment(unit: &Unit) {
    let (schema, package, source) = *unit;
    let mut store = RoutineStore::default();
    segment_and_store(
        SourceUnit::PackageBody { schema, package, source },
        &mut store,
    )
    .expect("segmentation failed");
}

/// Profile the full segment -> parse -> visitor -> emit pipeline for every
/// routine in a unit - kept as a separate function for clear flamegraph
/// boundaries.
#[inline(never)]
fn profile_transform(unit: &Unit) {
    let (schema, package, source) = *unit;
    let mut store = RoutineStore::default();
    segment_and_store(
        SourceUnit::PackageBody { schema, package, source },
        &mut store,
    )
    .expect("segmentation failed");

    let idx = MetadataIndex::default();
    let config = TransformConfig::new(schema);
    for record in store.stubs_for(schema, package) {
        let name = QualifiedName::new(schema, package).with_sub_name(&record.method_key);
        let _outcome = transform_routine(&name, package, &record.method_key, &store, &idx, &config, None)
            .expect("transform failed");
    }
}
