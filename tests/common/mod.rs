use std::sync::Arc;

use rand::rngs::StdRng;

use rumbos_lib::Plugs;
use rumbos_lib::behaviour::Behaviour;
use rumbos_lib::config::{IslandConfiguration,PortConfiguration,SimulationConfiguration};
use rumbos_lib::routing::GreedyPlanner;

/*
	Helpers shared by the integration tests: configurations built directly in memory and a
	behaviour record with all randomness removed.
*/

///No creation, no retirement, every ship sails every timestep, and destinations go
///round-robin, so a run unfolds identically on any worker count.
#[allow(dead_code)]
pub fn deterministic_behaviour() -> Behaviour
{
	Behaviour{
		should_create_new_ship: never_create,
		should_remove_ship: never_remove,
		will_ship_move: always_move,
		get_target_port: next_port,
	}
}

fn never_create(_total:i32,_rng:&mut StdRng) -> bool
{
	false
}

fn never_remove(_hours:i32,_rng:&mut StdRng) -> bool
{
	false
}

fn always_move(_number:usize,_rng:&mut StdRng) -> bool
{
	true
}

fn next_port(number_ports:usize,current_port:usize,_rng:&mut StdRng) -> usize
{
	(current_port+1)%number_ports
}

#[allow(dead_code)]
pub fn deterministic_plugs() -> Plugs
{
	Plugs{
		planner: Arc::new(GreedyPlanner),
		behaviour: deterministic_behaviour(),
	}
}

#[allow(dead_code)]
pub fn port(x:i32,y:i32,cargo:i32) -> PortConfiguration
{
	PortConfiguration{ x, y, cargo }
}

#[allow(dead_code)]
pub fn island(x:i32,y:i32) -> IslandConfiguration
{
	IslandConfiguration{ x, y }
}

#[allow(dead_code)]
pub fn configuration(size_x:i32,size_y:i32,ports:Vec<PortConfiguration>,islands:Vec<IslandConfiguration>,initial_ships:usize,number_timesteps:usize) -> SimulationConfiguration
{
	SimulationConfiguration{
		size_x,
		size_y,
		number_timesteps,
		dt: 10,
		initial_ships,
		report_stats_every: 1,
		ports,
		islands,
		random_seed: None,
	}
}
