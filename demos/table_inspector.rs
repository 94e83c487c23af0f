use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    hybrid_dialogue::example_apps::run_table_inspector(std::env::args().skip(1))
}
