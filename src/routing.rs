/*!

Route planning. For every ordered pair of ports a route map is computed: an integer field
over the local slab whose values increase along an obstacle-avoiding path from the source
port to the target port. Ships consult the maps through [RouteTable::next_cell], asking for
a neighbouring cell one step further along their route.

The planning walker runs in global coordinates and is executed identically by every worker,
so its trajectory agrees everywhere without any communication; only the write-back into the
slab is filtered to owned columns. One halo swap per finished map mirrors the neighbouring
boundary steps into the ghost columns, which lets `next_cell` answer locally at partition
edges.

A map cell holds `BLOCKED_CELL` on islands, the step number where the walker passed, and 0
elsewhere. The source port also holds 0; this is harmless because lookups always start from
a cell whose own step the ship is standing on and only ask for the step after it.

*/

use std::time::Instant;

use crate::config::SimulationConfiguration;
use crate::fabric::Fabric;
use crate::matrix::Matrix;
use crate::partition::Partition;

///Score of movements that must never be taken: staying put, leaving the grid, islands.
const LOW_SCORE:i32 = -10;
///Value of blocked cells in a route map.
pub const BLOCKED_CELL:i32 = -1;

///The obstacle map the planner consults: the grid extent plus the blocked sea cells.
#[derive(Clone,Debug)]
pub struct Chart
{
	pub size_x: i32,
	pub size_y: i32,
	blocked: Vec<(i32,i32)>,
}

impl Chart
{
	pub fn from_configuration(configuration:&SimulationConfiguration) -> Chart
	{
		Chart{
			size_x: configuration.size_x,
			size_y: configuration.size_y,
			blocked: configuration.islands.iter().map(|island|(island.x,island.y)).collect(),
		}
	}
	///Whether an island blocks the cell.
	pub fn is_blocked(&self,x:i32,y:i32) -> bool
	{
		self.blocked.iter().any(|&(blocked_x,blocked_y)|blocked_x==x&&blocked_y==y)
	}
	///Whether the coordinates lie on the grid at all.
	pub fn contains(&self,x:i32,y:i32) -> bool
	{
		x>=0 && x<self.size_x && y>=0 && y<self.size_y
	}
}

///One planned route: the pair of cells it joins and the step field over the local slab.
#[derive(Clone,Debug)]
pub struct RouteMap
{
	pub source: (i32,i32),
	pub target: (i32,i32),
	pub steps: Matrix<i32>,
}

///How route maps are generated. A planner sees the whole chart and one worker's stripe.
pub trait RoutePlanner
{
	///Plan the map for one ordered pair, or `None` when no route was found.
	fn plan(&self,chart:&Chart,partition:&Partition,source:(i32,i32),target:(i32,i32)) -> Option<RouteMap>;
}

///A greedy walker. At every cell it scores the nine movements by the progress they make
///towards the target, takes the best one, and stamps the increasing step counter as it
///goes. It never backtracks its counter, so a blocked-in walker aborts rather than search;
///routes are decent around scattered islands but not optimal.
pub struct GreedyPlanner;

impl RoutePlanner for GreedyPlanner
{
	fn plan(&self,chart:&Chart,partition:&Partition,source:(i32,i32),target:(i32,i32)) -> Option<RouteMap>
	{
		let mut steps=Matrix::constant(0,partition.mem_size_x(),partition.mem_size_y());
		for local_x in 1..=partition.local_nx
		{
			for local_y in 1..=chart.size_y as usize
			{
				if chart.is_blocked(partition.basex+local_x as i32-1,local_y as i32-1)
				{
					*steps.get_mut(local_x,local_y)=BLOCKED_CELL;
				}
			}
		}
		let (mut current_x,mut current_y)=source;
		let mut route_counter=1;
		for _ in 0..chart.size_x*chart.size_y
		{
			//Ties resolve to the earliest scanned offset, so the walk is the same everywhere.
			let mut best_score=LOW_SCORE;
			let (mut best_x,mut best_y)=(0,0);
			for i in 0..3
			{
				for j in 0..3
				{
					let score= if i==1&&j==1
					{
						LOW_SCORE
					}
					else
					{
						generate_score(chart,current_x,current_y,target,i-1,j-1)
					};
					if score>best_score
					{
						best_x=i-1;
						best_y=j-1;
						best_score=score;
					}
				}
			}
			if best_score==LOW_SCORE
			{
				//No valid movement from here: the walker is boxed in.
				return None;
			}
			current_x+=best_x;
			current_y+=best_y;
			if partition.owns(current_x)
			{
				*steps.get_mut(partition.local_from_global(current_x),(current_y+1) as usize)=route_counter;
			}
			if (current_x,current_y)==target
			{
				return Some(RouteMap{ source, target, steps });
			}
			route_counter+=1;
		}
		None
	}
}

///Score of moving by `(offset_x,offset_y)`: the summed per-axis progress towards the
///target, or `LOW_SCORE` for movements off the grid or onto a blocked cell.
fn generate_score(chart:&Chart,source_x:i32,source_y:i32,target:(i32,i32),offset_x:i32,offset_y:i32) -> i32
{
	let (target_x,target_y)=target;
	let (new_x,new_y)=(source_x+offset_x,source_y+offset_y);
	if !chart.contains(new_x,new_y)
	{
		return LOW_SCORE;
	}
	if chart.is_blocked(new_x,new_y)
	{
		return LOW_SCORE;
	}
	let x_diff=(target_x-source_x).abs()-(target_x-new_x).abs();
	let y_diff=(target_y-source_y).abs()-(target_y-new_y).abs();
	x_diff+y_diff
}

///Every planned map of one worker, plus the per-port table pointing into it.
pub struct RouteTable
{
	partition: Partition,
	maps: Vec<RouteMap>,
	///For each source port, the route index towards every other port.
	target_route_indexes: Vec<Vec<Option<usize>>>,
	unroutable: usize,
}

impl RouteTable
{
	pub fn new(number_ports:usize,partition:Partition) -> RouteTable
	{
		RouteTable{
			partition,
			maps: vec![],
			target_route_indexes: vec![vec![None;number_ports];number_ports],
			unroutable: 0,
		}
	}
	fn insert(&mut self,source_port:usize,target_port:usize,map:RouteMap) -> usize
	{
		let index=self.maps.len();
		self.maps.push(map);
		self.target_route_indexes[source_port][target_port]=Some(index);
		index
	}
	///The planned route from one port towards another, if there is one.
	pub fn route_between(&self,source_port:usize,target_port:usize) -> Option<usize>
	{
		self.target_route_indexes[source_port][target_port]
	}
	pub fn map(&self,route:usize) -> &RouteMap
	{
		&self.maps[route]
	}
	pub fn number_routes(&self) -> usize
	{
		self.maps.len()
	}
	///Ordered pairs for which planning failed.
	pub fn unroutable_pairs(&self) -> usize
	{
		self.unroutable
	}
	///The offset towards the cell one step further along the route, or `None` when no
	///neighbouring cell continues it. The ship then stays put for the timestep. Ghost
	///columns are legitimate sources of the next step.
	pub fn next_cell(&self,route:usize,current_x:i32,current_y:i32) -> Option<(i32,i32)>
	{
		let map=&self.maps[route];
		let local_x=self.partition.local_from_global(current_x);
		let current_step=*map.steps.get(local_x,(current_y+1) as usize);
		for i in -1..=1
		{
			for j in -1..=1
			{
				let (new_x,new_y)=(current_x+i,current_y+j);
				if new_x>=0 && new_x<self.partition.size_x && new_y>=0 && new_y<self.partition.size_y
					&& *map.steps.get((local_x as i32+i) as usize,(current_y+1+j) as usize)==current_step+1
				{
					return Some((i,j));
				}
			}
		}
		None
	}
}

///Plan the maps of every ordered pair of ports. Every worker executes the same traversal
///and ends with the same table shape; worker 0 reports the planning time. A failed pair is
///reported on stderr and counted, leaving its table entry empty.
pub fn run_route_planner(configuration:&SimulationConfiguration,partition:&Partition,fabric:&Fabric,planner:&dyn RoutePlanner) -> RouteTable
{
	let chart=Chart::from_configuration(configuration);
	let mut table=RouteTable::new(configuration.ports.len(),*partition);
	fabric.barrier();
	let begin=Instant::now();
	for source_port in 0..configuration.ports.len()
	{
		for target_port in 0..configuration.ports.len()
		{
			if source_port==target_port
			{
				continue;
			}
			let source=(configuration.ports[source_port].x,configuration.ports[source_port].y);
			let target=(configuration.ports[target_port].x,configuration.ports[target_port].y);
			match planner.plan(&chart,partition,source,target)
			{
				None =>
				{
					eprintln!("Error, can not plan a route between points X={},Y={} and X={},Y={}",source.0,source.1,target.0,target.1);
					table.unroutable+=1;
				},
				Some(mut map) =>
				{
					fabric.halo_swap(&mut map.steps);
					table.insert(source_port,target_port,map);
				},
			}
		}
	}
	fabric.barrier();
	if fabric.rank()==0
	{
		println!("The time of route planning is {}",begin.elapsed().as_secs_f64());
	}
	table
}
