#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::collections::BTreeMap;

use abstutil::{prettyprint_usize, Timer};
use anyhow::Result;
use structopt::StructOpt;

use feed::{Snapshot, VehicleReport};
use model::{CycleQueue, Engine, EngineConfig, StopChain};

#[derive(StructOpt)]
struct Args {
    /// The path to a JSON snapshot with routes, route stops, schedules, and optionally vehicles
    #[structopt(long)]
    snapshot: String,
    /// The path to a CSV log of vehicle telemetry, replayed one poll at a time against the
    /// snapshot
    #[structopt(long)]
    telemetry: Option<String>,
    /// The path to JSON engine settings
    #[structopt(long)]
    config: Option<String>,
    /// Only describe this route
    #[structopt(long)]
    route: Option<String>,
    /// Dump the final chains as JSON
    #[structopt(long)]
    json: bool,
}

impl Args {
    fn load_config(&self) -> Result<EngineConfig> {
        match self.config {
            Some(ref path) => serde_json::from_slice(&fs_err::read(path)?)
                .map_err(|err| anyhow!("{path}: {err}")),
            None => Ok(EngineConfig::default()),
        }
    }

    // Returns the last snapshot queued, for describing the final state
    fn queue_cycles(&self, queue: &CycleQueue, timer: &mut Timer) -> Result<Snapshot> {
        let base = Snapshot::load(&self.snapshot)?;
        let sender = queue.sender();
        let path = match self.telemetry {
            Some(ref path) => path,
            None => {
                sender.push(base.clone())?;
                return Ok(base);
            }
        };

        timer.start("load telemetry");
        let cycles = feed::replay::load(fs_err::File::open(path)?)?;
        timer.stop("load telemetry");
        let last = match cycles.last() {
            Some(cycle) => base.with_vehicles(cycle.time, cycle.vehicles.clone()),
            None => bail!("{path} has no telemetry"),
        };
        info!("Replaying {} poll cycles from {path}", prettyprint_usize(cycles.len()));
        for cycle in cycles {
            sender.push(base.with_vehicles(cycle.time, cycle.vehicles))?;
        }
        Ok(last)
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();
    let args = Args::from_iter(abstutil::cli_args());

    let mut timer = Timer::new("replay telemetry");
    let mut engine = Engine::new(args.load_config()?);
    let mut queue = CycleQueue::new();
    let last = args.queue_cycles(&queue, &mut timer)?;

    timer.start("reconcile");
    let summaries = queue.drain(&mut engine);
    timer.stop("reconcile");

    let mut totals: BTreeMap<&str, usize> = BTreeMap::new();
    for summary in &summaries {
        for (key, count) in summary.stats.borrow() {
            *totals.entry(*key).or_insert(0) += *count;
        }
    }
    info!(
        "{} cycles, {} trips folded",
        prettyprint_usize(summaries.len()),
        prettyprint_usize(summaries.iter().map(|s| s.folded_trips).sum())
    );
    for (key, count) in totals {
        info!("  {key}: {}", prettyprint_usize(count));
    }

    describe(&args, &engine, &last)
}

fn describe(args: &Args, engine: &Engine, snapshot: &Snapshot) -> Result<()> {
    for route in &snapshot.routes {
        if let Some(ref only) = args.route {
            if &route.route_id.0 != only {
                continue;
            }
        }
        println!(
            "{}: {}",
            route.describe(),
            engine.status(snapshot, &route.route_id).describe()
        );
        if let Some(stops) = snapshot.route_stops.get(&route.route_id) {
            let bounds = feed::bounds(stops).to_bounds();
            println!(
                "  {} stops, spanning {:.0}m by {:.0}m",
                stops.len(),
                bounds.max_x - bounds.min_x,
                bounds.max_y - bounds.min_y
            );
        }

        let chains = match engine.chains(&route.route_id) {
            Some(chains) => chains,
            None => {
                println!("  No stop chains yet");
                continue;
            }
        };
        for (idx, chain) in chains.iter().enumerate() {
            if args.json {
                println!("{}", serde_json::to_string_pretty(chain)?);
            } else {
                print_chain(idx, chain);
            }
        }

        let vehicles: Vec<&VehicleReport> = snapshot
            .vehicles_for(&route.route_id, &engine.config().offline_comm_statuses)
            .collect();
        for vehicle in vehicles {
            println!(
                "  Vehicle {} passed {}, next stop {}",
                vehicle.vehicle_id,
                vehicle.last_stop,
                engine
                    .next_scheduled_stop(vehicle, snapshot.now)
                    .unwrap_or("unknown")
            );
        }
    }
    Ok(())
}

fn print_chain(idx: usize, chain: &StopChain) {
    println!(
        "  Schedule {}: {} to {}, {} to {}",
        idx + 1,
        chain.dates.begin,
        chain.dates.end,
        chain.hours.first,
        chain.hours.last
    );
    for (_, node) in chain.ordered() {
        println!("    {}", node.node_name());
    }

    let name_of = |id| {
        chain
            .get(id)
            .map(|n| n.node_name())
            .unwrap_or_else(|| "?".to_string())
    };
    for (_, node) in chain.nodes().filter(|(_, n)| !n.scheduled) {
        println!(
            "    inferred {}, after {}, before {}",
            node.node_name(),
            node.upstream.map(name_of).unwrap_or_else(|| "?".to_string()),
            node.downstream.map(name_of).unwrap_or_else(|| "?".to_string())
        );
    }
}
