use crate::models::SearchResult;
use std::fmt::Write;

const RULE: &str = "---------------------------------------------------------------";

/// 渲染最优方案的文本报表：逐行数量/单价/金额、合计、误差
pub fn render_table(result: &SearchResult) -> String {
    let mut out = String::new();

    let headline = if result.solved {
        "Found a perfect answer."
    } else {
        "Not found a perfect answer."
    };
    // 写入 String 不会失败
    let _ = writeln!(out, " {} ({} engine, {} iterations, seed {})", headline, result.engine, result.iterations, result.seed);
    let _ = writeln!(out);
    let _ = writeln!(out, "   #        amount         price           money");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out);

    for (i, item) in result.best_allocation.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}     {:>8}       {:>8.2}       {:>10.2}",
            i + 1,
            item.quantity,
            item.price,
            item.money()
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, " Total                                 {:>10.2}", result.total);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, " Error                                 {:>10.2}", result.signed_error);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, " The best price error:  {:.16}", result.residual_error);
    let _ = writeln!(out, "{}", RULE);

    out
}
