use crate::models::SearchResult;
use std::path::Path;

/// 导出最优方案到 CSV 文件：每个商品一行，外加合计行
pub fn export_csv(
    result: &SearchResult,
    output_path: &Path,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    use csv::Writer;
    use std::fs::File;

    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["index", "quantity", "price", "money"])?;
    for (i, item) in result.best_allocation.iter().enumerate() {
        writer.write_record(&[
            (i + 1).to_string(),
            item.quantity.to_string(),
            format!("{:.2}", item.price),
            format!("{:.2}", item.money()),
        ])?;
    }
    writer.write_record(&[
        "total".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", result.total),
    ])?;

    writer.flush()?;
    tracing::info!("结果已导出到 {}", output_path.display());
    Ok(())
}
