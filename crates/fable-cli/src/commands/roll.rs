use colored::Colorize;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn run(expr: &str, seed: Option<u64>) -> Result<(), String> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let roll = fable_mechanics::roll_expression(expr, &mut rng).map_err(|e| e.to_string())?;
    println!("  {} {roll}", "Rolled".bold());
    Ok(())
}
