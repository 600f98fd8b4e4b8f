/*!
rumbos-lib
=====

This crate provides the RUMBOS simulator as a library: a modular, discrete-time simulator
of maritime shipping networks on a rectangular grid of water, port, and island cells.

# Usage

This crate is `rumbos-lib`. To use it add `rumbos-lib` to your dependencies in your
project's `Cargo.toml`.

```toml
[dependencies]
rumbos-lib = "0.1"
```

Alternatively, consider whether the binary `rumbos` fits your intended use.

# Model

Ports generate ships that carry cargo to other ports along pre-planned routes avoiding the
islands. Before the first timestep, a route map is planned for every ordered pair of ports:
an integer field whose values increase along an obstacle-avoiding path, so a sailing ship
only ever has to find the neighbouring cell one step further along. Each timestep then
proceeds in two half-steps: first every port rolls its dwell window, creates and dispatches
ships, and every ship at sea ages and decides whether it sails; then every flagged ship
moves one cell along its route.

The grid is split along X into one stripe of columns per worker. Workers are peer threads
joined by a message fabric; route maps keep one ghost column per side synchronized with the
neighbours, and ships crossing a stripe boundary are shipped to the adjacent worker in
explicit frames within the same timestep. Periodic and final statistics are reduced onto
worker 0, which is the only worker that prints.

# Public Interface

[file_main] receives the path of a configuration file, validates it, and launches a run
with the default plugs. [launch] is the programmatic entry: it receives the parsed
[SimulationConfiguration](config::SimulationConfiguration), the worker count, a base seed,
and the [Plugs] record bundling the pluggable strategies (the route planner and the
stochastic [Behaviour](behaviour::Behaviour) policies). Worker 0's view of the finished run
comes back as a [SimulationSummary].

# Configuration Syntax

The configuration is a plain text file of `KEY = INT` lines; see the [config] module for
the recognized keys and an example.

*/

pub mod config;
pub mod error;
pub mod partition;
pub mod matrix;
pub mod fabric;
pub mod routing;
pub mod domain;
pub mod behaviour;
pub mod measures;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use rand::{SeedableRng,rngs::StdRng};

use behaviour::Behaviour;
use config::SimulationConfiguration;
use domain::{CellKind,Domain,Ship,MAX_SHIPS_PER_CELL};
use error::Error;
use fabric::Fabric;
use measures::{GeneralStatistics,PortSummary};
use partition::Partition;
use routing::{GreedyPlanner,RoutePlanner,RouteTable,run_route_planner};

///Plugged strategies of a run: how routes are generated and how ships behave. One record
///travels into every worker.
#[derive(Clone)]
pub struct Plugs
{
	pub planner: Arc<dyn RoutePlanner+Send+Sync>,
	pub behaviour: Behaviour,
}

impl Default for Plugs
{
	fn default() -> Plugs
	{
		Plugs{
			planner: Arc::new(GreedyPlanner),
			behaviour: Behaviour::default(),
		}
	}
}

///Worker 0's view of a finished run.
#[derive(Clone,Debug)]
pub struct SimulationSummary
{
	///Simulated hours at the end of the run.
	pub hours: i64,
	///The last periodic report, when any was emitted.
	pub last_general_statistics: Option<GeneralStatistics>,
	///Cargo totals of every port of the whole grid.
	pub ports: Vec<PortSummary>,
}

///One worker's whole simulation state.
pub struct Simulation
{
	pub configuration: SimulationConfiguration,
	pub partition: Partition,
	pub fabric: Fabric,
	pub routes: RouteTable,
	pub domain: Domain,
	pub behaviour: Behaviour,
	pub rng: StdRng,
	///Simulated hours so far.
	pub hours: i64,
	last_report: Option<GeneralStatistics>,
}

impl Simulation
{
	///Initialise one worker: plan every route, then build the domain. Fails when some
	///ordered pair of ports cannot be routed, since dispatching a ship onto the missing
	///map could never be answered.
	pub fn new(configuration:SimulationConfiguration,fabric:Fabric,plugs:&Plugs,seed:u64) -> Result<Simulation,Error>
	{
		let partition=Partition::new(configuration.size_x,configuration.size_y,fabric.size(),fabric.rank());
		let mut rng=StdRng::seed_from_u64(seed.wrapping_add(fabric.rank() as u64));
		let routes=run_route_planner(&configuration,&partition,&fabric,plugs.planner.as_ref());
		if routes.unroutable_pairs()>0
		{
			return Err(Error::UnroutablePorts{ pairs:routes.unroutable_pairs() });
		}
		let behaviour=plugs.behaviour;
		let domain=Domain::new(&configuration,partition,&routes,&behaviour,&mut rng);
		Ok(Simulation{
			configuration,
			partition,
			fabric,
			routes,
			domain,
			behaviour,
			rng,
			hours: 0,
			last_report: None,
		})
	}
	///Run the configured number of timesteps, reporting periodically, and emit the final
	///report. Worker 0 returns the summary.
	pub fn run(&mut self) -> Option<SimulationSummary>
	{
		self.fabric.barrier();
		let begin=Instant::now();
		for timestep in 0..self.configuration.number_timesteps
		{
			self.step();
			if timestep%self.configuration.report_stats_every==0
			{
				self.report_general_statistics();
			}
			self.hours+=self.configuration.dt as i64;
		}
		self.fabric.barrier();
		if self.fabric.rank()==0
		{
			println!("The time of simulation is {}",begin.elapsed().as_secs_f64());
		}
		let final_hours=(self.configuration.dt as i64)*(self.configuration.number_timesteps as i64);
		let ports=measures::report_final_information(&self.fabric,&self.domain,final_hours);
		ports.map(|ports|SimulationSummary{
			hours: final_hours,
			last_general_statistics: self.last_report,
			ports,
		})
	}
	///One timestep: the properties half-step, then the movement half-step with its
	///boundary migration. The caller is responsible for keeping all workers stepping the
	///same number of times.
	pub fn step(&mut self)
	{
		self.update_properties();
		self.update_movement();
	}
	fn report_general_statistics(&mut self)
	{
		let local=measures::local_general_statistics(&self.domain);
		if let Some(global)=measures::reduce_general_statistics(&self.fabric,local)
		{
			measures::report_general_statistics(&global,self.hours);
			self.last_report=Some(global);
		}
	}
	///First half-step: ports roll their dwell window, create and dispatch ships; ships at
	///sea age and decide whether they sail this timestep. Islands need no update.
	fn update_properties(&mut self)
	{
		for local_x in 1..=self.partition.local_nx
		{
			for local_y in 1..=self.configuration.size_y as usize
			{
				match self.domain.cell(local_x,local_y).kind
				{
					CellKind::Port => self.process_port(local_x,local_y),
					CellKind::Water => self.process_water(local_x,local_y),
					CellKind::Island => (),
				}
			}
		}
	}
	fn process_port(&mut self,local_x:usize,local_y:usize)
	{
		let behaviour=self.behaviour;
		let number_ships=self.domain.cell(local_x,local_y).ships.len() as i32;
		//Roll the ten-slot dwell window and total it together with the current count.
		let mut total_ships=0;
		{
			let port=self.domain.cell_mut(local_x,local_y).port.as_mut().expect("a port cell without port state");
			for slot in 0..9
			{
				port.ships_in_past_hundred_hours[slot]=port.ships_in_past_hundred_hours[slot+1];
				total_ships+=port.ships_in_past_hundred_hours[slot];
			}
			port.ships_in_past_hundred_hours[9]=number_ships;
			total_ships+=number_ships;
		}
		if (behaviour.should_create_new_ship)(total_ships,&mut self.rng)
			&& self.domain.cell(local_x,local_y).ships.len()<MAX_SHIPS_PER_CELL
		{
			//The new ship is dispatched by the berth scan below, which sets its route.
			let id=self.domain.allocate_ship_id();
			self.domain.cell_mut(local_x,local_y).ships.push(Ship{
				id,
				route: 0,
				hours_at_sea: 0,
				cargo_amount: 0,
				will_move_this_timestep: false,
			});
		}
		//Every berthed ship unloads; then it is either retired or loaded and dispatched.
		let port_index=self.domain.cell(local_x,local_y).port.as_ref().expect("a port cell without port state").port_index;
		let number_ports=self.configuration.ports.len();
		let cargo=self.configuration.ports[port_index].cargo;
		let mut slot=0;
		while slot<self.domain.cell(local_x,local_y).ships.len()
		{
			let (cargo_amount,hours_at_sea)=
			{
				let ship=&self.domain.cell(local_x,local_y).ships[slot];
				(ship.cargo_amount,ship.hours_at_sea)
			};
			self.domain.cell_mut(local_x,local_y).port.as_mut().expect("a port cell without port state").cargo_arrived+=cargo_amount as i64;
			let crowded=self.domain.cell(local_x,local_y).ships.len()>1;
			if crowded && (behaviour.should_remove_ship)(hours_at_sea,&mut self.rng)
			{
				self.domain.cell_mut(local_x,local_y).ships.remove(slot);
				self.domain.ships_destroyed+=1;
			}
			else
			{
				let target=(behaviour.get_target_port)(number_ports,port_index,&mut self.rng);
				let route=self.routes.route_between(port_index,target).expect("a planned route towards the chosen port") as i32;
				let cell=self.domain.cell_mut(local_x,local_y);
				{
					let ship=&mut cell.ships[slot];
					ship.will_move_this_timestep=true;
					ship.route=route;
					ship.cargo_amount=cargo;
				}
				cell.port.as_mut().expect("a port cell without port state").cargo_shipped+=cargo as i64;
				slot+=1;
			}
		}
	}
	fn process_water(&mut self,local_x:usize,local_y:usize)
	{
		let behaviour=self.behaviour;
		let dt=self.configuration.dt;
		let number_ships=self.domain.cell(local_x,local_y).ships.len();
		for slot in 0..number_ships
		{
			if (behaviour.will_ship_move)(number_ships,&mut self.rng)
			{
				self.domain.cell_mut(local_x,local_y).ships[slot].will_move_this_timestep=true;
			}
			//Hours elapse whether or not the ship gets to sail.
			self.domain.cell_mut(local_x,local_y).ships[slot].hours_at_sea+=dt;
		}
	}
	///Second half-step: move every flagged ship one cell along its route. Ships whose next
	///cell lies in a ghost column are buffered and exchanged with the neighbouring
	///workers, settling in their new owner within the same timestep.
	fn update_movement(&mut self)
	{
		let mut eastbound_ships=vec![];
		let mut eastbound_rows=vec![];
		let mut westbound_ships=vec![];
		let mut westbound_rows=vec![];
		for local_x in 1..=self.partition.local_nx
		{
			for local_y in 1..=self.configuration.size_y as usize
			{
				let mut slot=0;
				while slot<self.domain.cell(local_x,local_y).ships.len()
				{
					if !self.domain.cell(local_x,local_y).ships[slot].will_move_this_timestep
					{
						slot+=1;
						continue;
					}
					//The flag drops now, so the ship cannot move again when the scan
					//reaches the cell it lands in.
					self.domain.cell_mut(local_x,local_y).ships[slot].will_move_this_timestep=false;
					let route=self.domain.cell(local_x,local_y).ships[slot].route as usize;
					let current_x=self.partition.basex+local_x as i32-1;
					let current_y=local_y as i32-1;
					let offset=match self.routes.next_cell(route,current_x,current_y)
					{
						None =>
						{
							slot+=1;
							continue;
						},
						Some(offset) => offset,
					};
					let new_x=(local_x as i32+offset.0) as usize;
					let new_y=(local_y as i32+offset.1) as usize;
					if new_x==self.partition.local_nx+1
					{
						let ship=self.domain.cell_mut(local_x,local_y).ships.remove(slot);
						eastbound_ships.push(ship.to_record());
						eastbound_rows.push(new_y as i32);
					}
					else if new_x==0
					{
						let ship=self.domain.cell_mut(local_x,local_y).ships.remove(slot);
						westbound_ships.push(ship.to_record());
						westbound_rows.push(new_y as i32);
					}
					else if !self.domain.transfer_ship((local_x,local_y),slot,(new_x,new_y))
					{
						//Destination roster full: the move aborts and the ship stays.
						slot+=1;
					}
				}
			}
		}
		let (from_east,from_west)=self.fabric.exchange_ships((eastbound_ships,eastbound_rows),(westbound_ships,westbound_rows));
		//Received ships re-home into the owned edge column at their destination row.
		let east_edge=self.partition.local_nx;
		for (record,row) in from_east
		{
			if !self.domain.receive_ship((east_edge,row as usize),Ship::from_record(&record))
			{
				self.domain.ships_destroyed+=1;
			}
		}
		for (record,row) in from_west
		{
			if !self.domain.receive_ship((1,row as usize),Ship::from_record(&record))
			{
				self.domain.ships_destroyed+=1;
			}
		}
	}
}

///Options of a run besides the configuration itself.
#[derive(Clone,Debug)]
pub struct RunOptions
{
	///How many workers share the grid.
	pub workers: usize,
}

impl Default for RunOptions
{
	fn default() -> RunOptions
	{
		RunOptions{ workers:1 }
	}
}

///Main when passed a configuration file as path: load it, validate it, and launch the run
///with the default plugs.
pub fn file_main(path:&Path,options:&RunOptions) -> Result<SimulationSummary,Error>
{
	let configuration=SimulationConfiguration::from_file(path)?;
	configuration.validate()?;
	let seed=configuration.random_seed.unwrap_or_else(wall_clock_seed);
	launch(&configuration,options.workers,seed,&Plugs::default())
}

///Seed used when the configuration fixes none.
fn wall_clock_seed() -> u64
{
	use std::time::{SystemTime,UNIX_EPOCH};
	SystemTime::now().duration_since(UNIX_EPOCH).expect("the clock predates the epoch").as_secs()
}

///Launch `workers` peer threads over one fabric ring and run the whole simulation in
///lockstep. Worker `rank` seeds its generator with `seed+rank`. The summary assembled by
///worker 0 is returned.
pub fn launch(configuration:&SimulationConfiguration,workers:usize,seed:u64,plugs:&Plugs) -> Result<SimulationSummary,Error>
{
	if workers==0 || workers>configuration.size_x as usize
	{
		return Err(Error::BadConfiguration{
			message: format!("{} workers cannot split {} columns",workers,configuration.size_x),
		});
	}
	let handles:Vec<_>=Fabric::ring(workers).into_iter().map(|fabric|{
		let configuration=configuration.clone();
		let plugs=plugs.clone();
		thread::spawn(move||->Result<Option<SimulationSummary>,Error>{
			let mut simulation=Simulation::new(configuration,fabric,&plugs,seed)?;
			Ok(simulation.run())
		})
	}).collect();
	let mut summary=None;
	let mut failure=None;
	for handle in handles
	{
		match handle.join().expect("a worker panicked")
		{
			Ok(Some(worker_summary)) => summary=Some(worker_summary),
			Ok(None) => (),
			Err(error) => failure=Some(error),
		}
	}
	match failure
	{
		Some(error) => Err(error),
		None => Ok(summary.expect("worker 0 finished without a summary")),
	}
}
