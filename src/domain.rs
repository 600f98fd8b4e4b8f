/*!

The cells of one worker's stripe and the ships berthed or sailing in them. Every cell is
water, a port, or an island, fixed for the whole run. Ships live in a dense per-cell roster
bounded by [MAX_SHIPS_PER_CELL]; the roster length is the live count. Ships are only ever
stored in owned cells, never in the ghost columns.

*/

use itertools::iproduct;
use rand::rngs::StdRng;

use crate::behaviour::Behaviour;
use crate::config::SimulationConfiguration;
use crate::fabric::ShipRecord;
use crate::matrix::Matrix;
use crate::partition::Partition;
use crate::routing::RouteTable;

///Hard bound of ships a single cell can hold. Arrivals beyond it are refused.
pub const MAX_SHIPS_PER_CELL:usize = 200;

///What occupies a grid cell.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum CellKind
{
	Water,
	Port,
	Island,
}

///A ship in some cell's roster.
#[derive(Clone,Copy,Debug)]
pub struct Ship
{
	pub id: i64,
	///Index into the worker's route table.
	pub route: i32,
	pub hours_at_sea: i32,
	pub cargo_amount: i32,
	pub will_move_this_timestep: bool,
}

impl Ship
{
	///Copy into the form that travels between workers.
	pub fn to_record(&self) -> ShipRecord
	{
		ShipRecord{
			id: self.id,
			route: self.route,
			hours_at_sea: self.hours_at_sea,
			cargo_amount: self.cargo_amount,
			will_move_this_timestep: self.will_move_this_timestep as i32,
		}
	}
	///Rebuild from the travelling form.
	pub fn from_record(record:&ShipRecord) -> Ship
	{
		Ship{
			id: record.id,
			route: record.route,
			hours_at_sea: record.hours_at_sea,
			cargo_amount: record.cargo_amount,
			will_move_this_timestep: record.will_move_this_timestep!=0,
		}
	}
}

///Runtime state of a port.
#[derive(Clone,Debug,Default)]
pub struct PortState
{
	pub port_index: usize,
	pub cargo_shipped: i64,
	pub cargo_arrived: i64,
	///Rolling window of the berthed-ship counts of the last ten timesteps. Slot 9 is the
	///most recent.
	pub ships_in_past_hundred_hours: [i32;10],
}

///One cell of the local slab.
#[derive(Clone,Debug)]
pub struct Cell
{
	pub kind: CellKind,
	///Present exactly on port cells.
	pub port: Option<PortState>,
	pub ships: Vec<Ship>,
}

impl Default for Cell
{
	fn default() -> Cell
	{
		Cell{
			kind: CellKind::Water,
			port: None,
			ships: vec![],
		}
	}
}

///The slab of cells a worker owns, with a ghost column at each side and wall rows above
///and below.
pub struct Domain
{
	pub partition: Partition,
	pub cells: Matrix<Cell>,
	next_ship_id: i64,
	///Ships ever brought into existence on this worker.
	pub ships_created: i64,
	///Ships retired here, plus arrivals refused on capacity.
	pub ships_destroyed: i64,
}

impl Domain
{
	///Build the slab from the configuration: mark ports and islands, and place the initial
	///ships, each already assigned a route towards some other port.
	pub fn new(configuration:&SimulationConfiguration,partition:Partition,routes:&RouteTable,behaviour:&Behaviour,rng:&mut StdRng) -> Domain
	{
		let mut domain=Domain{
			partition,
			cells: Matrix::constant(Cell::default(),partition.mem_size_x(),partition.mem_size_y()),
			//Ids never repeat between workers: each worker allocates from its own block.
			next_ship_id: (partition.rank as i64)<<32,
			ships_created: 0,
			ships_destroyed: 0,
		};
		for (local_x,local_y) in iproduct!(1..=partition.local_nx,1..=configuration.size_y as usize)
		{
			let x=partition.basex+local_x as i32-1;
			let y=local_y as i32-1;
			if let Some(port_index)=configuration.cell_port_index(x,y)
			{
				domain.initialise_port(configuration,routes,behaviour,rng,(local_x,local_y),port_index);
			}
			else if configuration.is_cell_an_island(x,y)
			{
				domain.cells.get_mut(local_x,local_y).kind=CellKind::Island;
			}
		}
		domain
	}
	fn initialise_port(&mut self,configuration:&SimulationConfiguration,routes:&RouteTable,behaviour:&Behaviour,rng:&mut StdRng,location:(usize,usize),port_index:usize)
	{
		let mut ships=Vec::with_capacity(configuration.initial_ships);
		for _ in 0..configuration.initial_ships
		{
			let target=(behaviour.get_target_port)(configuration.ports.len(),port_index,rng);
			let route=routes.route_between(port_index,target).expect("a planned route towards the chosen port") as i32;
			ships.push(Ship{
				id: self.allocate_ship_id(),
				route,
				hours_at_sea: 0,
				cargo_amount: 0,
				will_move_this_timestep: true,
			});
		}
		let cell=self.cells.get_mut(location.0,location.1);
		cell.kind=CellKind::Port;
		cell.port=Some(PortState{ port_index, ..PortState::default() });
		cell.ships=ships;
	}
	///A fresh ship id, unique for the whole run.
	pub fn allocate_ship_id(&mut self) -> i64
	{
		let id=self.next_ship_id;
		self.next_ship_id+=1;
		self.ships_created+=1;
		id
	}
	pub fn cell(&self,local_x:usize,local_y:usize) -> &Cell
	{
		self.cells.get(local_x,local_y)
	}
	pub fn cell_mut(&mut self,local_x:usize,local_y:usize) -> &mut Cell
	{
		self.cells.get_mut(local_x,local_y)
	}
	///Move the ship at `slot` of `from` into `to`. When the destination roster is full the
	///move silently aborts and the ship stays where it was.
	pub fn transfer_ship(&mut self,from:(usize,usize),slot:usize,to:(usize,usize)) -> bool
	{
		let (source,destination)=self.cells.get2_mut(from,to);
		if destination.ships.len()>=MAX_SHIPS_PER_CELL
		{
			return false;
		}
		destination.ships.push(source.ships.remove(slot));
		true
	}
	///Home a migrated ship into an owned edge cell. Returns false when the roster is full
	///and the ship is dropped.
	pub fn receive_ship(&mut self,location:(usize,usize),ship:Ship) -> bool
	{
		let cell=self.cells.get_mut(location.0,location.1);
		if cell.ships.len()>=MAX_SHIPS_PER_CELL
		{
			return false;
		}
		cell.ships.push(ship);
		true
	}
	///Iterate the owned cells in scan order, ghost columns and wall rows excluded.
	pub fn owned_cells(&self) -> impl Iterator<Item=&Cell>
	{
		iproduct!(1..=self.partition.local_nx,1..=self.partition.size_y as usize)
			.map(move|(local_x,local_y)|self.cells.get(local_x,local_y))
	}
	///Ships currently berthed or sailing in owned cells.
	pub fn number_ships(&self) -> usize
	{
		self.owned_cells().map(|cell|cell.ships.len()).sum()
	}
}
