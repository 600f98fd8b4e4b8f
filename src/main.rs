use std::path::Path;
use std::process::exit;

use getopts::Options;

use rumbos_lib::{file_main,RunOptions};

fn main()
{
	let args:Vec<String>=std::env::args().collect();
	let mut opts=Options::new();
	opts.optopt("w","workers","number of workers sharing the grid","COUNT");
	opts.optflag("h","help","show this help");
	let matches=match opts.parse(&args[1..])
	{
		Ok(matches) => matches,
		Err(error) =>
		{
			eprintln!("{}",error);
			exit(1);
		},
	};
	if matches.opt_present("help")
	{
		print!("{}",opts.usage(&format!("Usage: {} [options] CONFIGURATION_FILE",args[0])));
		return;
	}
	let path=match matches.free.get(0)
	{
		Some(path) => path,
		None =>
		{
			eprintln!("You must provide the simulation configuration as an input parameter");
			exit(1);
		},
	};
	let workers=match matches.opt_str("workers")
	{
		None => 1,
		Some(text) => match text.parse()
		{
			Ok(workers) => workers,
			Err(_) =>
			{
				eprintln!("bad value for workers: {}",text);
				exit(1);
			},
		},
	};
	if let Err(error)=file_main(Path::new(path),&RunOptions{ workers })
	{
		eprintln!("{}",error);
		exit(1);
	}
}
