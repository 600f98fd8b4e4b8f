/*!

The simulation configuration: a line-oriented file of `KEY = INT` entries describing the
global grid, the ports and islands placed on it, and the timestepping parameters.

Lines starting with `#` and blank lines are ignored. A line that cannot be understood is
skipped with a warning on stderr rather than aborting the whole run. The `NUM_PORTS` and
`NUM_ISLANDS` entries size their tables and must appear before any `PORT_n_*`/`ISLAND_n_*`
line referring to them.

An example configuration:

```text
# A small square sea with two ports.
SIZE_X = 16
SIZE_Y = 16
NUM_TIMESTEPS = 100
DT = 10
INITIAL_SHIPS = 2
REPORT_STATS_EVERY = 10
NUM_PORTS = 2
PORT_0_X = 0
PORT_0_Y = 10
PORT_0_CARGO = 50
PORT_1_X = 14
PORT_1_Y = 15
PORT_1_CARGO = 70
NUM_ISLANDS = 1
ISLAND_0_X = 2
ISLAND_0_Y = 12
```

*/

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::Error;

///A port as the configuration declares it.
#[derive(Clone,Copy,Debug,Default)]
pub struct PortConfiguration
{
	pub x: i32,
	pub y: i32,
	///Cargo loaded onto every ship this port dispatches.
	pub cargo: i32,
}

///A blocked sea cell.
#[derive(Clone,Copy,Debug,Default)]
pub struct IslandConfiguration
{
	pub x: i32,
	pub y: i32,
}

///Everything read from the configuration file. Replicated into every worker.
#[derive(Clone,Debug)]
pub struct SimulationConfiguration
{
	pub size_x: i32,
	pub size_y: i32,
	pub number_timesteps: usize,
	///Hours of simulated time per timestep.
	pub dt: i32,
	///Ships placed in every port before the first timestep.
	pub initial_ships: usize,
	///Cadence of the periodic reports, in timesteps.
	pub report_stats_every: usize,
	pub ports: Vec<PortConfiguration>,
	pub islands: Vec<IslandConfiguration>,
	///Fixed base seed for the random number generators. Taken from the clock when absent.
	pub random_seed: Option<u64>,
}

impl Default for SimulationConfiguration
{
	fn default() -> SimulationConfiguration
	{
		SimulationConfiguration{
			size_x: 0,
			size_y: 0,
			number_timesteps: 0,
			dt: 1,
			initial_ships: 0,
			report_stats_every: 1,
			ports: vec![],
			islands: vec![],
			random_seed: None,
		}
	}
}

impl SimulationConfiguration
{
	pub fn from_file(path:&Path) -> Result<SimulationConfiguration,Error>
	{
		let contents=fs::read_to_string(path).map_err(|io_error|Error::CouldNotReadConfiguration{
			path: path.to_path_buf(),
			io_error,
		})?;
		contents.parse()
	}
	///Whether a port occupies the cell.
	pub fn is_cell_a_port(&self,x:i32,y:i32) -> bool
	{
		self.cell_port_index(x,y).is_some()
	}
	///The port at the cell, if any.
	pub fn cell_port_index(&self,x:i32,y:i32) -> Option<usize>
	{
		self.ports.iter().position(|port|port.x==x&&port.y==y)
	}
	///Whether an island occupies the cell.
	pub fn is_cell_an_island(&self,x:i32,y:i32) -> bool
	{
		self.islands.iter().any(|island|island.x==x&&island.y==y)
	}
	///Check that the configuration describes a grid the simulation can actually run on.
	pub fn validate(&self) -> Result<(),Error>
	{
		let bad=|message:String|Err(Error::BadConfiguration{ message });
		if self.size_x<1||self.size_y<1
		{
			return bad(format!("the grid extent {}x{} is empty",self.size_x,self.size_y));
		}
		if self.dt<1
		{
			return bad(format!("DT must be at least 1, got {}",self.dt));
		}
		if self.report_stats_every<1
		{
			return bad("REPORT_STATS_EVERY must be at least 1".to_string());
		}
		for (index,port) in self.ports.iter().enumerate()
		{
			if port.x<0||port.x>=self.size_x||port.y<0||port.y>=self.size_y
			{
				return bad(format!("port {} at ({},{}) lies outside the grid",index,port.x,port.y));
			}
			if self.cell_port_index(port.x,port.y)!=Some(index)
			{
				return bad(format!("two ports occupy the cell ({},{})",port.x,port.y));
			}
			if self.is_cell_an_island(port.x,port.y)
			{
				return bad(format!("port {} at ({},{}) sits on an island",index,port.x,port.y));
			}
		}
		for (index,island) in self.islands.iter().enumerate()
		{
			if island.x<0||island.x>=self.size_x||island.y<0||island.y>=self.size_y
			{
				return bad(format!("island {} at ({},{}) lies outside the grid",index,island.x,island.y));
			}
		}
		if self.ports.len()==1&&self.initial_ships>0
		{
			return bad("a single port has nowhere to dispatch its ships".to_string());
		}
		Ok(())
	}
}

impl FromStr for SimulationConfiguration
{
	type Err = Error;
	fn from_str(contents:&str) -> Result<SimulationConfiguration,Error>
	{
		let mut configuration=SimulationConfiguration::default();
		for line in contents.lines()
		{
			let line=line.trim_end();
			if line.is_empty()||line.starts_with('#')
			{
				continue;
			}
			let entry=line.split_once('=').and_then(|(key,value)|{
				value.trim().parse::<i64>().ok().map(|value|(key.trim(),value))
			});
			let (key,value)=match entry
			{
				Some(entry) => entry,
				None =>
				{
					eprintln!("Ignoring configuration line '{}' as this is malformed",line);
					continue;
				},
			};
			match key
			{
				"SIZE_X" => configuration.size_x=value as i32,
				"SIZE_Y" => configuration.size_y=value as i32,
				"NUM_TIMESTEPS" => configuration.number_timesteps=value as usize,
				"DT" => configuration.dt=value as i32,
				"INITIAL_SHIPS" => configuration.initial_ships=value as usize,
				"REPORT_STATS_EVERY" => configuration.report_stats_every=value as usize,
				"NUM_PORTS" => configuration.ports=vec![PortConfiguration::default();value as usize],
				"NUM_ISLANDS" => configuration.islands=vec![IslandConfiguration::default();value as usize],
				"RANDOM_SEED" => configuration.random_seed=Some(value as u64),
				key => match entity_key(key)
				{
					Some(("PORT",index,attribute)) if index<configuration.ports.len() =>
					{
						let port=&mut configuration.ports[index];
						match attribute
						{
							"X" => port.x=value as i32,
							"Y" => port.y=value as i32,
							"CARGO" => port.cargo=value as i32,
							_ => eprintln!("Ignoring configuration line '{}' as this is malformed",line),
						}
					},
					Some(("ISLAND",index,attribute)) if index<configuration.islands.len() =>
					{
						let island=&mut configuration.islands[index];
						match attribute
						{
							"X" => island.x=value as i32,
							"Y" => island.y=value as i32,
							_ => eprintln!("Ignoring configuration line '{}' as this is malformed",line),
						}
					},
					_ => eprintln!("Ignoring configuration line '{}' as this is malformed",line),
				},
			}
		}
		Ok(configuration)
	}
}

///Split a `PORT_3_X` style key into its kind, entity index, and attribute.
fn entity_key(key:&str) -> Option<(&'static str,usize,&str)>
{
	let (kind,rest)= if let Some(rest)=key.strip_prefix("PORT_")
	{
		("PORT",rest)
	}
	else if let Some(rest)=key.strip_prefix("ISLAND_")
	{
		("ISLAND",rest)
	}
	else
	{
		return None;
	};
	let (number,attribute)=rest.split_once('_')?;
	let index=number.parse().ok()?;
	Some((kind,index,attribute))
}
