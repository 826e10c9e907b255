use colored::*;
use indicatif::HumanBytes;
use splitpack_core::{Balance, Plan, SplitStatus};

const GROUPS_SHOWN: usize = 10;
const ITEMS_SHOWN: usize = 5;

pub fn print_plan(plan: &Plan) {
    let capacity = plan.packing.capacity;

    println!();
    println!("{}", "Groups".bold());
    for (index, group) in plan.packing.groups.iter().take(GROUPS_SHOWN).enumerate() {
        let review = if group.needs_review() {
            " needs review".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  Group {}: {} items, {} ({:.1}% of capacity){}",
            format!("{}", index + 1).cyan(),
            group.len(),
            HumanBytes(group.total_size()),
            group.utilization(capacity) * 100.0,
            review,
        );
        for item in group.items().iter().take(ITEMS_SHOWN) {
            println!(
                "    [{}] {} ({})",
                item.kind.as_str(),
                item.path.display(),
                HumanBytes(item.size)
            );
        }
        if group.len() > ITEMS_SHOWN {
            println!("    ... and {} more", group.len() - ITEMS_SHOWN);
        }
    }
    if plan.packing.groups.len() > GROUPS_SHOWN {
        println!(
            "  ... and {} more groups",
            plan.packing.groups.len() - GROUPS_SHOWN
        );
    }

    if !plan.collection.skipped.is_empty() {
        println!();
        println!("{}", "Oversized files".bold());
        for skipped in &plan.collection.skipped {
            println!(
                "  {} ({})",
                skipped.path.display(),
                HumanBytes(skipped.size)
            );
        }
    }

    if !plan.splits.is_empty() {
        println!();
        println!("{}", "Splits".bold());
        for outcome in &plan.splits {
            let status = match &outcome.status {
                SplitStatus::Split(parts) => format!("split into {} parts", parts).green(),
                SplitStatus::AlreadyComplete(parts) => {
                    format!("already split ({} parts)", parts).normal()
                }
                SplitStatus::Failed(reason) => format!("failed: {}", reason).red(),
            };
            println!("  {} -> {}: {}", outcome.source.display(), outcome.target.display(), status);
        }
    }

    print_statistics(plan);
}

fn print_statistics(plan: &Plan) {
    let stats = plan.packing.stats();
    let accounting = plan.accounting();

    println!();
    println!("{}", "Statistics".bold());
    println!("  Groups:              {}", stats.group_count);
    println!("  Files:               {}", stats.file_count);
    println!("  Directories:         {}", stats.directory_count);
    println!("  Grouped size:        {}", HumanBytes(stats.total_size));
    println!("  Average group size:  {}", HumanBytes(stats.average_group_size));
    println!("  Collection passes:   {}", plan.passes);
    if stats.review_groups > 0 {
        println!(
            "  Groups to review:    {}",
            format!("{}", stats.review_groups).yellow()
        );
    }
    if !plan.collection.pruned.is_empty() {
        println!(
            "  Pruned directories:  {}",
            format!("{}", plan.collection.pruned.len()).yellow()
        );
    }
    if plan.collection.errors > 0 {
        println!(
            "  Access errors:       {}",
            format!("{}", plan.collection.errors).yellow()
        );
    }
    if plan.collection.truncated {
        println!("  {}", "Item ceiling reached, results are partial".yellow());
    }

    println!();
    println!("  Scanned:             {}", HumanBytes(accounting.scanned));
    println!("  Grouped:             {}", HumanBytes(accounting.grouped));
    println!("  Oversized:           {}", HumanBytes(accounting.skipped));
    if accounting.contained > 0 {
        println!("  Already contained:   {}", HumanBytes(accounting.contained));
    }
    match accounting.balance {
        Balance::Exact => println!("  {}", "Every scanned byte is accounted for".green()),
        Balance::Missing(bytes) => println!(
            "  {}",
            format!("{} bytes scanned but not accounted for", bytes).red()
        ),
        Balance::Excess(bytes) => println!(
            "  {}",
            format!("{} bytes accounted beyond the scan", bytes).red()
        ),
    }
}

pub fn print_merge_summary(processed: usize, succeeded: usize, failed: usize) {
    println!();
    println!("{}", "Merge summary".bold());
    println!("  Processed: {}", processed);
    println!("  Succeeded: {}", format!("{}", succeeded).green());
    if failed > 0 {
        println!("  Failed:    {}", format!("{}", failed).red());
    } else {
        println!("  Failed:    {}", failed);
    }
}
