use colored::Colorize;
use lucid_core::{ExplanationLayer, ExplanationMode, ExplanationTree, ReadingLevel};

pub fn header(title: &str) {
    println!("{}", title.bold().underline());
}

pub fn subheader(title: &str) {
    println!("{}", title.bold());
}

pub fn hint(msg: &str) {
    eprintln!("{} {}", "hint:".cyan().bold(), msg.dimmed());
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), msg);
}

pub fn layer_title(mode: ExplanationMode, index: usize) -> String {
    match mode {
        ExplanationMode::Leveled(level) => level.label().to_string(),
        ExplanationMode::Layered => match index {
            0 => "Layer 1 · Beginner".to_string(),
            1 => "Layer 2 · Detailed".to_string(),
            2 => "Layer 3 · Technical".to_string(),
            n => format!("Layer {}", n + 1)
        }
    }
}

pub fn print_tree(tree: &ExplanationTree, mode: ExplanationMode) {
    for topic in &tree.topics {
        println!();
        header(&topic.name);

        for concept in &topic.concepts {
            println!();
            subheader(&format!("  {}", concept.name));

            for (i, layer) in concept.layers.iter().enumerate() {
                println!("    {}", layer_title(mode, i).cyan());
                print_layer(layer);
            }
        }
    }

    if let Some(takeaway) = &tree.main_takeaway {
        println!();
        println!("{} {}", "Main takeaway:".green().bold(), takeaway);
    }
}

fn print_layer(layer: &ExplanationLayer) {
    if layer.why.is_empty() && layer.how.is_empty() {
        println!("      {}", layer.what);
        return;
    }
    println!("      {} {}", "What:".dimmed(), layer.what);
    println!("      {} {}", "Why:".dimmed(), layer.why);
    println!("      {} {}", "How:".dimmed(), layer.how);
}

pub fn print_levels() {
    header("Reading levels");
    for level in ReadingLevel::ALL {
        println!();
        println!(
            "  {} {} {}",
            level.label().bold(),
            format!("({})", level.grade_code()).dimmed(),
            level.age_range()
        );
        println!("    {}", level.description());
    }
}
