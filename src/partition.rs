/*!

The 1-D domain decomposition. The global grid is split along X into one contiguous stripe of
columns per worker. When the extent does not divide evenly, the first `size_x mod size`
workers take one extra column. Each worker allocates its stripe plus one ghost column at
each side and one wall row above and below.

*/

///The stripe of global columns one worker owns.
#[derive(Clone,Copy,Debug)]
pub struct Partition
{
	///This worker.
	pub rank: usize,
	///Total number of workers.
	pub size: usize,
	///Global grid extent in X.
	pub size_x: i32,
	///Global grid extent in Y.
	pub size_y: i32,
	///Owned columns.
	pub local_nx: usize,
	///First owned global column.
	pub basex: i32,
}

impl Partition
{
	pub fn new(size_x:i32,size_y:i32,size:usize,rank:usize) -> Partition
	{
		let columns=size_x as usize;
		let base=columns/size;
		let extra=columns-base*size;
		let (local_nx,basex)= if rank<extra
		{
			(base+1,rank*(base+1))
		}
		else
		{
			(base,extra*(base+1)+(rank-extra)*base)
		};
		Partition{
			rank,
			size,
			size_x,
			size_y,
			local_nx,
			basex: basex as i32,
		}
	}
	///Whether this worker owns the global column `x`.
	pub fn owns(&self,x:i32) -> bool
	{
		x>=self.basex && x<self.basex+self.local_nx as i32
	}
	///The slab row (1-based, ghosts at 0 and `local_nx+1`) of an owned global column.
	pub fn local_from_global(&self,x:i32) -> usize
	{
		(x-self.basex+1) as usize
	}
	///Allocated slab extent in X, ghost columns included.
	pub fn mem_size_x(&self) -> usize
	{
		self.local_nx+2
	}
	///Allocated slab extent in Y, wall rows included.
	pub fn mem_size_y(&self) -> usize
	{
		self.size_y as usize+2
	}
}
