
///A simple matrix struct storing a column-striped slab. Entry `(x,y)` lives at
///`data[x*num_columns+y]`: each matrix row is one grid column, so the boundary columns that
///travel between workers are contiguous slices. Index 0 and the last index are the ghost
///columns in X and the wall rows in Y.
#[derive(Clone,Debug)]
pub struct Matrix<T>
{
	data: Vec<T>,
	num_columns: usize,
}

impl<T> Matrix<T>
{
	///Read a matrix entry.
	pub fn get(&self,x:usize,y:usize) -> &T
	{
		&self.data[x*self.num_columns+y]
	}
	///Read/write a matrix entry.
	pub fn get_mut(&mut self,x:usize,y:usize) -> &mut T
	{
		&mut self.data[x*self.num_columns+y]
	}
	///Read/write two distinct entries at once.
	pub fn get2_mut(&mut self,first:(usize,usize),second:(usize,usize)) -> (&mut T,&mut T)
	{
		let a=first.0*self.num_columns+first.1;
		let b=second.0*self.num_columns+second.1;
		if a==b
		{
			panic!("requested the same entry ({},{}) twice",first.0,first.1);
		}
		if a<b
		{
			let (low,high)=self.data.split_at_mut(b);
			(&mut low[a],&mut high[0])
		}
		else
		{
			let (low,high)=self.data.split_at_mut(a);
			(&mut high[0],&mut low[b])
		}
	}
	///Get the number of rows, i.e., the allocated extent in X.
	pub fn get_rows(&self) -> usize
	{
		self.data.len()/self.num_columns
	}
	///Get the number of columns, i.e., the allocated extent in Y.
	pub fn get_columns(&self) -> usize
	{
		self.num_columns
	}
	///Build a matrix with constant values.
	pub fn constant(value:T,num_rows:usize,num_columns:usize) -> Matrix<T> where T:Clone
	{
		Matrix{
			data: vec![value;num_rows*num_columns],
			num_columns,
		}
	}
	pub fn map<U,F:FnMut(&T)->U>(&self, f:F) -> Matrix<U>
	{
		Matrix{
			data: self.data.iter().map(f).collect(),
			num_columns: self.num_columns,
		}
	}
	///Clone the interior entries of the grid column at local x `x`, wall rows excluded.
	pub fn column(&self,x:usize) -> Vec<T> where T:Clone
	{
		(1..self.num_columns-1).map(|y|self.get(x,y).clone()).collect()
	}
	///Overwrite the interior entries of the grid column at local x `x`.
	pub fn set_column(&mut self,x:usize,values:&[T]) where T:Clone
	{
		if values.len()!=self.num_columns-2
		{
			panic!("a column of {} values cannot fill {} interior entries",values.len(),self.num_columns-2);
		}
		for (index,value) in values.iter().enumerate()
		{
			*self.get_mut(x,index+1)=value.clone();
		}
	}
}

impl<T> IntoIterator for Matrix<T>
{
	type Item = T;
	type IntoIter = <Vec<T> as IntoIterator>::IntoIter;
	fn into_iter(self) -> <Self as IntoIterator>::IntoIter
	{
		self.data.into_iter()
	}
}

#[cfg(test)]
mod tests
{
	use super::*;
	#[test]
	fn columns_round_trip()
	{
		let mut matrix=Matrix::constant(0,4,5);
		matrix.set_column(2,&[7,8,9]);
		assert_eq!(matrix.column(2),vec![7,8,9]);
		assert_eq!(*matrix.get(2,0),0);
		assert_eq!(*matrix.get(2,4),0);
		assert_eq!(*matrix.get(2,1),7);
	}
	#[test]
	fn two_entries_at_once()
	{
		let mut matrix=Matrix::constant(0,3,3);
		let (a,b)=matrix.get2_mut((0,1),(2,2));
		*a=5;
		*b=6;
		assert_eq!(*matrix.get(0,1),5);
		assert_eq!(*matrix.get(2,2),6);
	}
}
