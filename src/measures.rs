/*!

Module encapsulating the statistics of a run.

The periodic report aggregates three measures over every worker: ships at sea, ships in
port, and cargo in transit. Cargo only counts as in transit while its ship is on water; a
loaded ship berthed at its destination is counted by neither measure until the port books
its cargo as arrived. The final report gathers the per-port cargo totals at worker 0.

*/

use crate::domain::{CellKind,Domain};
use crate::fabric::Fabric;

///The three global measures of the periodic report.
#[derive(Clone,Copy,Debug,Default,PartialEq,Eq)]
pub struct GeneralStatistics
{
	pub ships_at_sea: i64,
	pub ships_in_port: i64,
	pub cargo_in_transit: i64,
}

///Final cargo totals of one port.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct PortSummary
{
	pub port_index: usize,
	pub cargo_shipped: i64,
	pub cargo_arrived: i64,
}

///Tally the local share of the periodic measures.
pub fn local_general_statistics(domain:&Domain) -> GeneralStatistics
{
	let mut statistics=GeneralStatistics::default();
	for cell in domain.owned_cells()
	{
		match cell.kind
		{
			CellKind::Port => statistics.ships_in_port+=cell.ships.len() as i64,
			CellKind::Water =>
			{
				statistics.ships_at_sea+=cell.ships.len() as i64;
				statistics.cargo_in_transit+=cell.ships.iter().map(|ship|ship.cargo_amount as i64).sum::<i64>();
			},
			CellKind::Island => (),
		}
	}
	statistics
}

///Sum the local tallies onto worker 0.
pub fn reduce_general_statistics(fabric:&Fabric,local:GeneralStatistics) -> Option<GeneralStatistics>
{
	fabric.reduce_sum(&[local.ships_at_sea,local.ships_in_port,local.cargo_in_transit])
		.map(|totals|GeneralStatistics{
			ships_at_sea: totals[0],
			ships_in_port: totals[1],
			cargo_in_transit: totals[2],
		})
}

///Print one periodic report.
pub fn report_general_statistics(statistics:&GeneralStatistics,hours:i64)
{
	println!("======= Report at {} hours =======",hours);
	println!("{} ships at sea, {} ships in port, {} tonnes in transit",statistics.ships_at_sea,statistics.ships_in_port,statistics.cargo_in_transit);
}

///The cargo totals of this worker's ports, in scan order.
pub fn local_port_summaries(domain:&Domain) -> Vec<PortSummary>
{
	domain.owned_cells().filter_map(|cell|cell.port.as_ref()).map(|port|PortSummary{
		port_index: port.port_index,
		cargo_shipped: port.cargo_shipped,
		cargo_arrived: port.cargo_arrived,
	}).collect()
}

///Gather every worker's port totals at worker 0 and print the final report there: worker
///0's own ports first, then each worker's in rank order. Worker 0 returns all of them.
pub fn report_final_information(fabric:&Fabric,domain:&Domain,hours:i64) -> Option<Vec<PortSummary>>
{
	let own=local_port_summaries(domain);
	if fabric.rank()==0
	{
		println!("======= Final report at {} hours =======",hours);
	}
	let mut flattened=Vec::with_capacity(own.len()*3);
	for summary in &own
	{
		flattened.push(summary.port_index as i64);
		flattened.push(summary.cargo_shipped);
		flattened.push(summary.cargo_arrived);
	}
	match fabric.gather(flattened)
	{
		None => None,
		Some(remote) =>
		{
			let mut all=own;
			for values in remote
			{
				for triple in values.chunks_exact(3)
				{
					all.push(PortSummary{
						port_index: triple[0] as usize,
						cargo_shipped: triple[1],
						cargo_arrived: triple[2],
					});
				}
			}
			for summary in &all
			{
				println!("Port {} shipped {} tonnes and {} arrived",summary.port_index,summary.cargo_shipped,summary.cargo_arrived);
			}
			Some(all)
		},
	}
}
