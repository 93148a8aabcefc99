pub mod util;

pub use util::{parse_index_list, split_csv};
