/*!

The stochastic policies driving the ship lifecycle: when a port creates a ship, when a
berthed ship is retired, whether a ship at sea sails this timestep, and where a dispatched
ship is bound. All four are pure over their integer inputs plus the worker's random number
generator, and they are bundled as plain function values so a caller can swap any of them
for a deterministic policy.

Every worker draws from its own generator. With more than one worker the streams diverge
between runs of different worker counts, so equal totals between a 1-worker and a 4-worker
run are only expected per seed, not across worker counts.

*/

use rand::Rng;
use rand::rngs::StdRng;

///The pluggable lifecycle policies of a run.
#[derive(Clone,Copy)]
pub struct Behaviour
{
	///Whether a port creates a new ship, given the berthed-ship total of its dwell window.
	pub should_create_new_ship: fn(i32,&mut StdRng)->bool,
	///Whether a ship that has sailed long enough is taken out of service.
	pub should_remove_ship: fn(i32,&mut StdRng)->bool,
	///Whether a ship at sea moves this timestep, given the occupancy of its cell.
	pub will_ship_move: fn(usize,&mut StdRng)->bool,
	///Pick a destination port. Never returns the current port.
	pub get_target_port: fn(usize,usize,&mut StdRng)->usize,
}

impl Default for Behaviour
{
	fn default() -> Behaviour
	{
		Behaviour{
			should_create_new_ship,
			should_remove_ship,
			will_ship_move,
			get_target_port,
		}
	}
}

///Ports that saw at least ten berthed ships over the window create new ones, the busier
///the likelier.
pub fn should_create_new_ship(ships_in_past_hundred_hours:i32,rng:&mut StdRng) -> bool
{
	if ships_in_past_hundred_hours<10
	{
		return false;
	}
	rng.gen_range(0..30)<ships_in_past_hundred_hours
}

///Ships below a hundred hours at sea are never retired.
pub fn should_remove_ship(hours_at_sea:i32,rng:&mut StdRng) -> bool
{
	if hours_at_sea<100
	{
		return false;
	}
	rng.gen_range(0..6)==0
}

///Quiet cells always let their ships sail; crowded cells hold them back at random. The
///second draw only happens when the occupancy test passes.
pub fn will_ship_move(number_ships_in_cell:usize,rng:&mut StdRng) -> bool
{
	if number_ships_in_cell<4
	{
		return true;
	}
	if number_ships_in_cell as i32>rng.gen_range(0..20) && rng.gen_range(0..2)==0
	{
		return false;
	}
	true
}

///Uniform pick among the other ports.
pub fn get_target_port(number_ports:usize,current_port:usize,rng:&mut StdRng) -> usize
{
	let mut target=rng.gen_range(0..number_ports);
	while target==current_port
	{
		target=rng.gen_range(0..number_ports);
	}
	target
}
