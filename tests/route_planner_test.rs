mod common;

use std::thread;

use common::*;
use rumbos_lib::config::SimulationConfiguration;
use rumbos_lib::error::Error;
use rumbos_lib::fabric::Fabric;
use rumbos_lib::launch;
use rumbos_lib::partition::Partition;
use rumbos_lib::routing::{GreedyPlanner,RouteTable,run_route_planner};

fn plan_alone(configuration:&SimulationConfiguration) -> (Partition,RouteTable)
{
	let fabric=Fabric::ring(1).pop().unwrap();
	let partition=Partition::new(configuration.size_x,configuration.size_y,1,0);
	let table=run_route_planner(configuration,&partition,&fabric,&GreedyPlanner);
	(partition,table)
}

///Follow a planned route cell by cell, checking it stays off the islands and arrives
///within the step bound.
fn walk(configuration:&SimulationConfiguration,table:&RouteTable,route:usize,source:(i32,i32),target:(i32,i32)) -> usize
{
	let bound=(configuration.size_x*configuration.size_y) as usize;
	let (mut x,mut y)=source;
	let mut steps=0;
	while (x,y)!=target
	{
		let (dx,dy)=table.next_cell(route,x,y).expect("the route continues towards its target");
		x+=dx;
		y+=dy;
		assert!(!configuration.is_cell_an_island(x,y),"the route passes through the island at ({},{})",x,y);
		steps+=1;
		assert!(steps<bound,"the route must arrive in fewer than {} steps",bound);
	}
	steps
}

#[test]
fn plans_around_islands()
{
	let configuration=configuration(16,16,vec![port(0,10,50),port(14,15,70)],vec![island(2,12),island(5,15)],0,0);
	let (_,table)=plan_alone(&configuration);
	assert_eq!(table.unroutable_pairs(),0);
	assert_eq!(table.number_routes(),2);
	let route=table.route_between(0,1).unwrap();
	walk(&configuration,&table,route,(0,10),(14,15));
	let back=table.route_between(1,0).unwrap();
	walk(&configuration,&table,back,(14,15),(0,10));
}

#[test]
fn a_port_on_the_left_edge_is_reachable()
{
	let configuration=configuration(4,4,vec![port(0,0,10),port(3,3,20)],vec![],0,0);
	let (_,table)=plan_alone(&configuration);
	let route=table.route_between(1,0).unwrap();
	assert_eq!(walk(&configuration,&table,route,(3,3),(0,0)),3);
}

#[test]
fn route_steps_increase_one_neighbour_at_a_time()
{
	let configuration=configuration(16,16,vec![port(0,10,50),port(14,15,70)],vec![island(2,12),island(5,15)],0,0);
	let (partition,table)=plan_alone(&configuration);
	let map=table.map(table.route_between(0,1).unwrap());
	let mut maximum=0;
	for x in 1..=partition.local_nx
	{
		for y in 1..=16
		{
			maximum=maximum.max(*map.steps.get(x,y));
		}
	}
	//The final step lands on the target port cell.
	assert_eq!(*map.steps.get(15,16),maximum);
	for x in 1..=partition.local_nx
	{
		for y in 1..=16usize
		{
			let value=*map.steps.get(x,y);
			if value>=1&&value<maximum
			{
				let mut successors=0;
				for i in -1..=1i32
				{
					for j in -1..=1i32
					{
						if i==0&&j==0
						{
							continue;
						}
						if *map.steps.get((x as i32+i) as usize,(y as i32+j) as usize)==value+1
						{
							successors+=1;
						}
					}
				}
				assert_eq!(successors,1,"step {} at ({},{}) must have exactly one successor",value,x,y);
			}
		}
	}
}

#[test]
fn a_separating_island_chain_fails_both_directions()
{
	//Two stacked diagonals: a single diagonal of islands still lets diagonal movements
	//slip between two blocked cells.
	let mut islands=vec![];
	for x in 0..8
	{
		islands.push(island(x,7-x));
	}
	for x in 0..7
	{
		islands.push(island(x,6-x));
	}
	let configuration=configuration(8,8,vec![port(0,0,10),port(7,7,20)],islands,1,4);
	let (_,table)=plan_alone(&configuration);
	assert_eq!(table.number_routes(),0);
	assert_eq!(table.unroutable_pairs(),2);
	assert!(table.route_between(0,1).is_none());
	assert!(table.route_between(1,0).is_none());
	//A run over this configuration refuses to start.
	match launch(&configuration,1,1,&deterministic_plugs())
	{
		Err(Error::UnroutablePorts{pairs}) => assert_eq!(pairs,2),
		other => panic!("expected an unroutable failure, got {:?}",other.map(|_|())),
	}
}

#[test]
fn ghost_columns_mirror_the_neighbours()
{
	let configuration=configuration(9,5,vec![port(0,2,10),port(8,2,20)],vec![island(4,1)],0,0);
	let handles:Vec<_>=Fabric::ring(3).into_iter().map(|fabric|{
		let configuration=configuration.clone();
		thread::spawn(move||{
			let partition=Partition::new(configuration.size_x,configuration.size_y,3,fabric.rank());
			let table=run_route_planner(&configuration,&partition,&fabric,&GreedyPlanner);
			(partition,table)
		})
	}).collect();
	let results:Vec<(Partition,RouteTable)>=handles.into_iter().map(|handle|handle.join().unwrap()).collect();
	let (_,alone)=plan_alone(&configuration);
	assert!(results.iter().all(|(_,table)|table.number_routes()==alone.number_routes()));
	for route in 0..alone.number_routes()
	{
		for rank in 0..2
		{
			let (west_partition,west_table)=&results[rank];
			let (_,east_table)=&results[rank+1];
			let west_map=west_table.map(route);
			let east_map=east_table.map(route);
			//Each ghost column carries the neighbour's owned edge column.
			assert_eq!(west_map.steps.column(west_partition.local_nx+1),east_map.steps.column(1));
			assert_eq!(east_map.steps.column(0),west_map.steps.column(west_partition.local_nx));
		}
		//The owned columns agree with a single-worker plan of the same pair.
		for (partition,table) in &results
		{
			let map=table.map(route);
			let whole=alone.map(route);
			for local_x in 1..=partition.local_nx
			{
				let global_x=(partition.basex+local_x as i32-1+1) as usize;
				assert_eq!(map.steps.column(local_x),whole.steps.column(global_x));
			}
		}
	}
}

#[test]
fn planning_is_deterministic()
{
	let configuration=configuration(16,16,vec![port(0,10,50),port(14,15,70)],vec![island(2,12),island(5,15)],0,0);
	let (partition,first)=plan_alone(&configuration);
	let (_,second)=plan_alone(&configuration);
	assert_eq!(first.number_routes(),second.number_routes());
	for route in 0..first.number_routes()
	{
		for x in 0..partition.mem_size_x()
		{
			for y in 0..partition.mem_size_y()
			{
				assert_eq!(first.map(route).steps.get(x,y),second.map(route).steps.get(x,y));
			}
		}
	}
}
