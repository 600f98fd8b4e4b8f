/*!

The message fabric joining the workers of a run: one pair of channels per adjacent worker
pair, a barrier shared by all workers for the phase boundaries, and a reduction channel from
every worker towards worker 0.

Channels are unbounded, so every send completes immediately; receives block. Payloads travel
as raw bytes and are cast with bytemuck on both sides, so a frame carries exactly the
integers it frames and nothing else. A frame of the wrong kind at a receive is a protocol
bug and panics; it cannot arise from any runtime condition.

*/

use std::mem::size_of;
use std::sync::{Arc,Barrier};
use std::sync::mpsc::{channel,Sender,Receiver};

use crate::matrix::Matrix;

///The bytes of a ship travelling between two workers. All fields are plain integers so the
///whole payload can be cast as one slice; the flag is widened to an `i32`.
#[repr(C)]
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub struct ShipRecord
{
	pub id: i64,
	pub route: i32,
	pub hours_at_sea: i32,
	pub cargo_amount: i32,
	pub will_move_this_timestep: i32,
}

unsafe impl bytemuck::Zeroable for ShipRecord {}
unsafe impl bytemuck::Pod for ShipRecord {}

///What a frame carries. The receiver always knows which kind it expects next.
#[derive(Clone,Copy,Debug,PartialEq,Eq)]
pub enum FrameKind
{
	///One boundary column of a route map.
	HaloColumn,
	///The number of ships in the following migration payload. Sent even when zero, so the
	///peer never waits on a frame that is not coming.
	ShipCount,
	///The migrating ships themselves.
	ShipPayload,
	///The destination row of each migrating ship, in payload order.
	DestinationRows,
}

///One message travelling a link.
#[derive(Debug)]
pub struct Frame
{
	pub kind: FrameKind,
	pub payload: Vec<u8>,
}

///A bidirectional connection to one neighbouring worker.
struct Link
{
	tx: Sender<Frame>,
	rx: Receiver<Frame>,
}

///The reduction channels towards worker 0.
enum Collector
{
	///Worker 0 keeps one receiver per other worker, in rank order.
	Root(Vec<Receiver<Vec<i64>>>),
	Leaf(Sender<Vec<i64>>),
}

///Everything one worker needs to talk to the others. There is no shared state behind it:
///all cross-worker traffic goes through these channels or waits on the barrier.
pub struct Fabric
{
	rank: usize,
	size: usize,
	west: Option<Link>,
	east: Option<Link>,
	barrier: Arc<Barrier>,
	collector: Collector,
}

impl Fabric
{
	///Build the fabrics of a whole ring of `size` workers, in rank order.
	pub fn ring(size:usize) -> Vec<Fabric>
	{
		if size==0
		{
			panic!("a simulation needs at least one worker");
		}
		let barrier=Arc::new(Barrier::new(size));
		let mut wests:Vec<Option<Link>>=(0..size).map(|_|None).collect();
		let mut easts:Vec<Option<Link>>=(0..size).map(|_|None).collect();
		for rank in 0..size-1
		{
			let (east_tx,east_rx)=channel();
			let (west_tx,west_rx)=channel();
			easts[rank]=Some(Link{ tx:east_tx, rx:west_rx });
			wests[rank+1]=Some(Link{ tx:west_tx, rx:east_rx });
		}
		let mut roots=Vec::with_capacity(size.saturating_sub(1));
		let mut leaves:Vec<Option<Sender<Vec<i64>>>>=(0..size).map(|_|None).collect();
		for rank in 1..size
		{
			let (tx,rx)=channel();
			leaves[rank]=Some(tx);
			roots.push(rx);
		}
		let mut roots=Some(roots);
		(0..size).map(|rank|Fabric{
			rank,
			size,
			west: wests[rank].take(),
			east: easts[rank].take(),
			barrier: barrier.clone(),
			collector: match leaves[rank].take()
			{
				Some(tx) => Collector::Leaf(tx),
				None => Collector::Root(roots.take().expect("only worker 0 collects")),
			},
		}).collect()
	}
	pub fn rank(&self) -> usize
	{
		self.rank
	}
	pub fn size(&self) -> usize
	{
		self.size
	}
	///Block until every worker of the ring reaches the same point.
	pub fn barrier(&self)
	{
		self.barrier.wait();
	}
	fn send(link:&Link,kind:FrameKind,payload:Vec<u8>)
	{
		link.tx.send(Frame{ kind, payload }).expect("the neighbouring worker hung up");
	}
	fn recv(link:&Link,kind:FrameKind) -> Vec<u8>
	{
		let frame=link.rx.recv().expect("the neighbouring worker hung up");
		if frame.kind!=kind
		{
			panic!("protocol error: expected a {:?} frame, received a {:?} frame",kind,frame.kind);
		}
		frame.payload
	}
	///Synchronize the ghost columns of a column-striped integer slab with both neighbours.
	///Only interior entries travel; the wall rows never do. Both sends complete before any
	///receive is waited on, and end workers skip the absent side.
	pub fn halo_swap(&self,map:&mut Matrix<i32>)
	{
		let own_west=1;
		let own_east=map.get_rows()-2;
		if let Some(link)=&self.west
		{
			Self::send(link,FrameKind::HaloColumn,encode_i32s(&map.column(own_west)));
		}
		if let Some(link)=&self.east
		{
			Self::send(link,FrameKind::HaloColumn,encode_i32s(&map.column(own_east)));
		}
		if let Some(link)=&self.west
		{
			let values=decode_i32s(&Self::recv(link,FrameKind::HaloColumn));
			map.set_column(0,&values);
		}
		if let Some(link)=&self.east
		{
			let values=decode_i32s(&Self::recv(link,FrameKind::HaloColumn));
			map.set_column(own_east+1,&values);
		}
	}
	///Exchange the buffered boundary-crossing ships with both neighbours. The count frame
	///is mandatory even when empty; the payload frames follow only a positive count.
	///Receives drain east first, then west, mirroring the peers' send order.
	pub fn exchange_ships(&self,eastbound:(Vec<ShipRecord>,Vec<i32>),westbound:(Vec<ShipRecord>,Vec<i32>)) -> (Vec<(ShipRecord,i32)>,Vec<(ShipRecord,i32)>)
	{
		if let Some(link)=&self.east
		{
			Self::send_migration(link,eastbound);
		}
		if let Some(link)=&self.west
		{
			Self::send_migration(link,westbound);
		}
		let from_east=match &self.east
		{
			Some(link) => Self::recv_migration(link),
			None => vec![],
		};
		let from_west=match &self.west
		{
			Some(link) => Self::recv_migration(link),
			None => vec![],
		};
		(from_east,from_west)
	}
	fn send_migration(link:&Link,cargo:(Vec<ShipRecord>,Vec<i32>))
	{
		let (ships,rows)=cargo;
		if ships.len()!=rows.len()
		{
			panic!("{} migrating ships carry {} destination rows",ships.len(),rows.len());
		}
		Self::send(link,FrameKind::ShipCount,encode_i32s(&[ships.len() as i32]));
		if !ships.is_empty()
		{
			Self::send(link,FrameKind::ShipPayload,bytemuck::cast_slice(&ships).to_vec());
			Self::send(link,FrameKind::DestinationRows,encode_i32s(&rows));
		}
	}
	fn recv_migration(link:&Link) -> Vec<(ShipRecord,i32)>
	{
		let count=decode_i32s(&Self::recv(link,FrameKind::ShipCount))[0] as usize;
		if count==0
		{
			return vec![];
		}
		let ships:Vec<ShipRecord>=Self::recv(link,FrameKind::ShipPayload)
			.chunks_exact(size_of::<ShipRecord>())
			.map(bytemuck::pod_read_unaligned)
			.collect();
		let rows=decode_i32s(&Self::recv(link,FrameKind::DestinationRows));
		if ships.len()!=count || rows.len()!=count
		{
			panic!("protocol error: a migration payload does not match its count frame");
		}
		ships.into_iter().zip(rows).collect()
	}
	///Sum `values` element-wise over every worker. Only worker 0 obtains the result.
	pub fn reduce_sum(&self,values:&[i64]) -> Option<Vec<i64>>
	{
		match &self.collector
		{
			Collector::Leaf(tx) =>
			{
				tx.send(values.to_vec()).expect("worker 0 hung up");
				None
			},
			Collector::Root(receivers) =>
			{
				let mut total=values.to_vec();
				for rx in receivers
				{
					let part=rx.recv().expect("a worker hung up before reducing");
					if part.len()!=total.len()
					{
						panic!("protocol error: reducing arrays of lengths {} and {}",total.len(),part.len());
					}
					for (entry,value) in total.iter_mut().zip(part)
					{
						*entry+=value;
					}
				}
				Some(total)
			},
		}
	}
	///Collect one integer array per worker at worker 0, in rank order. Worker 0's own
	///`values` are not included in the result.
	pub fn gather(&self,values:Vec<i64>) -> Option<Vec<Vec<i64>>>
	{
		match &self.collector
		{
			Collector::Leaf(tx) =>
			{
				tx.send(values).expect("worker 0 hung up");
				None
			},
			Collector::Root(receivers) =>
			{
				Some(receivers.iter().map(|rx|rx.recv().expect("a worker hung up before gathering")).collect())
			},
		}
	}
}

fn encode_i32s(values:&[i32]) -> Vec<u8>
{
	bytemuck::cast_slice(values).to_vec()
}

fn decode_i32s(payload:&[u8]) -> Vec<i32>
{
	payload.chunks_exact(size_of::<i32>()).map(bytemuck::pod_read_unaligned).collect()
}
