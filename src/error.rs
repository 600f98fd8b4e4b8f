/*!

Errors reported by the simulator to its callers. Configuration problems are detected before
any worker starts; planning failures surface after the planning phase, before the first
timestep.

*/

use std::fmt::{self,Display};
use std::io;
use std::path::PathBuf;

///The failures that abort a run.
#[derive(Debug)]
pub enum Error
{
	///No configuration file was given on the command line.
	MissingConfigurationArgument,
	///The configuration file could not be read at all.
	CouldNotReadConfiguration{ path:PathBuf, io_error:io::Error },
	///The configuration was read but its contents are unusable.
	BadConfiguration{ message:String },
	///Some ordered pairs of ports have no planned route. Sailing such a pair would consult
	///a map that was never written, so the simulation refuses to start.
	UnroutablePorts{ pairs:usize },
}

impl Display for Error
{
	fn fmt(&self,f:&mut fmt::Formatter) -> fmt::Result
	{
		match self
		{
			Error::MissingConfigurationArgument => write!(f,"You must provide the simulation configuration as an input parameter"),
			Error::CouldNotReadConfiguration{path,io_error} => write!(f,"could not read the configuration file {:?}: {}",path,io_error),
			Error::BadConfiguration{message} => write!(f,"bad configuration: {}",message),
			Error::UnroutablePorts{pairs} => write!(f,"{} ordered pairs of ports could not be routed",pairs),
		}
	}
}

impl std::error::Error for Error {}
