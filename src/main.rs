use checkxact::numerical::equation_check::EquationChecker;
use std::env;
use std::process::ExitCode;

// CheckXACT demo binary: pass M and N on the command line, or run the
// built-in walkthrough pairs.
//
//   checkxact "2*x*y" "x^2"
//   checkxact --loglevel debug "y" "x"
fn main() -> ExitCode {
    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut loglevel = Some("info".to_string());
    if args.first().map(|a| a == "--loglevel").unwrap_or(false) {
        args.remove(0);
        if args.is_empty() {
            eprintln!("--loglevel needs a value: off, debug, info, warn or error");
            return ExitCode::FAILURE;
        }
        loglevel = Some(args.remove(0));
    }

    let pairs: Vec<(String, String)> = if args.len() == 2 {
        vec![(args[0].clone(), args[1].clone())]
    } else if args.is_empty() {
        // walkthrough: an exact homogeneous pair, a non-exact pair and a
        // pair with a pole on the sampling grid
        vec![
            ("y".to_string(), "x".to_string()),
            ("x*y".to_string(), "x*y".to_string()),
            ("x".to_string(), "x".to_string()),
            ("x+1".to_string(), "x+1".to_string()),
            ("1/(x-1)".to_string(), "x".to_string()),
        ]
    } else {
        eprintln!("usage: checkxact [--loglevel LEVEL] \"M(x,y)\" \"N(x,y)\"");
        return ExitCode::FAILURE;
    };

    let mut checker = EquationChecker::new();
    checker.set_loglevel(loglevel);
    let mut failures = 0;
    for (m_expr, n_expr) in pairs {
        println!("\nM(x, y) = {}", m_expr);
        println!("N(x, y) = {}", n_expr);
        checker.set_equations(&m_expr, &n_expr);
        match checker.check() {
            Ok(report) => println!("{}", report),
            Err(err) => {
                eprintln!("An error occurred: {}", err);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
