use crate::config::{InvoiceConfig, SearchConfig};
use crate::models::{SearchParameters, SearchResult};
use crate::report;
use crate::service::{InvoiceBalancer, RandomNumberSource};

/// 读取发票文件（失败或无有效商品时用默认配置），求解一次，按需导出 CSV
pub fn run_once(
    search: &SearchConfig,
) -> Result<SearchResult, Box<dyn std::error::Error + Send + Sync>> {
    let invoice = match InvoiceConfig::load(&search.invoice_file) {
        Ok(invoice) if !invoice.goods.is_empty() => invoice,
        Ok(_) => {
            tracing::warn!(
                "{} 中没有有效商品, 使用默认配置",
                search.invoice_file.display()
            );
            InvoiceConfig::default()
        }
        Err(e) => {
            tracing::warn!("{}, 使用默认配置", e);
            InvoiceConfig::default()
        }
    };
    tracing::info!(
        "发票配置: 目标金额 {:.2}, 浮动 {:.2}, {} 个商品",
        invoice.total_price,
        invoice.fluctuation,
        invoice.goods.len()
    );

    let rng = match search.seed {
        Some(seed) => RandomNumberSource::from_seed(seed),
        None => RandomNumberSource::from_entropy(),
    };
    let params = SearchParameters::new(invoice.total_price, invoice.fluctuation)
        .with_max_iterations(search.max_iterations);
    let result = InvoiceBalancer::new(rng).solve_with(search.engine, params, &invoice.goods)?;

    if let Some(path) = &search.report_csv {
        report::export_csv(&result, path)?;
    }

    Ok(result)
}
