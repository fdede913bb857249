//! Dashboard Page
//!
//! Business summary for a date window, refreshed in the background.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_interval::use_interval;
use tracing::debug;

use crate::api::{self, Query};
use crate::calc::{format_currency, format_opt_date, sales_summary, SalesSummary};
use crate::components::{DateFilterBar, Loading};
use crate::context::use_app;
use crate::dates::{date_range, local_now, DateFilter};
use crate::models::{ref_name, MaterialStats, Sale};
use crate::store::OPTION_LIMIT;

const RECENT_SALES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
struct DashboardStats {
    total_sales: u64,
    summary: SalesSummary,
    total_products: u64,
    materials: MaterialStats,
}

fn status_label(sale: &Sale) -> &'static str {
    if sale.is_paid() {
        "Concluído"
    } else {
        "Pendente"
    }
}

/// Only the newest fetch of a still-mounted page may write results
fn is_latest(generation: StoredValue<u64>, current: u64) -> bool {
    generation.try_get_value() == Some(current)
}

#[component]
pub fn DashboardPage() -> impl IntoView {
    let ctx = use_app();
    let filter = RwSignal::new(DateFilter::All);
    let custom_start = RwSignal::new(String::new());
    let custom_end = RwSignal::new(String::new());
    let (stats, set_stats) = signal(DashboardStats::default());
    let (recent, set_recent) = signal(Vec::<Sale>::new());
    let (loaded, set_loaded) = signal(false);
    let (refreshing, set_refreshing) = signal(false);
    let generation = StoredValue::new(0u64);

    let fetch = move || {
        let current = generation.get_value() + 1;
        generation.set_value(current);
        let range = date_range(
            filter.get_untracked(),
            &custom_start.get_untracked(),
            &custom_end.get_untracked(),
            local_now(),
        );
        set_refreshing.set(true);
        spawn_local(async move {
            let api = ctx.api();
            let mut query = Query::new().limit(OPTION_LIMIT);
            if let Some(range) = range {
                query = query.params(range.timestamp_params());
            }

            let sales = api::list_sales(&api, query).await;
            let products = api::list_products(&api, Query::new().limit(1)).await;
            let materials = api::material_stats(&api).await.unwrap_or_else(|err| {
                debug!(error = %err, "material stats unavailable");
                MaterialStats::default()
            });
            if !is_latest(generation, current) {
                return;
            }

            match (sales, products) {
                (Ok(sales), Ok(products)) => {
                    set_stats.set(DashboardStats {
                        total_sales: sales.total(),
                        summary: sales_summary(&sales.items),
                        total_products: products.total(),
                        materials,
                    });
                    set_recent.set(sales.items.into_iter().take(RECENT_SALES).collect());
                }
                (Err(err), _) | (_, Err(err)) => ctx.report_quietly(&err, "dashboard"),
            }
            set_loaded.set(true);
            set_refreshing.set(false);
        });
    };

    // refetch whenever the window changes
    Effect::new(move |_| {
        filter.track();
        custom_start.track();
        custom_end.track();
        fetch();
    });
    let timer = use_interval(ctx.config().stats_refresh, fetch);

    let first_name = move || {
        ctx.auth
            .user()
            .map(|user| user.first_name().to_string())
            .unwrap_or_else(|| "Usuário".to_string())
    };

    view! {
        <Show when=move || loaded.get() fallback=|| view! { <Loading message="Carregando dashboard..." /> }>
            <div class="dashboard">
                <div class="dashboard-header">
                    <div>
                        <h1>{move || format!("Bem-vindo de volta, {}!", first_name())}</h1>
                        <p class="dashboard-welcome">"Aqui está um resumo do seu negócio"</p>
                    </div>
                    <div class="dashboard-header-actions">
                        <DateFilterBar filter=filter custom_start=custom_start custom_end=custom_end />
                        <button
                            class="btn-refresh"
                            title="Atualizar dados"
                            disabled=move || refreshing.get()
                            on:click=move |_| {
                                fetch();
                                timer.restart();
                            }
                        >
                            {move || if refreshing.get() { "Atualizando..." } else { "Atualizar" }}
                        </button>
                    </div>
                </div>

                <div class="stats-grid">
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Receita Total"</h3>
                        <p class="stat-card-value">{move || format_currency(stats.with(|s| s.summary.revenue))}</p>
                        <span class="stat-card-subtext">
                            {move || format!("{} vendas no período", stats.with(|s| s.total_sales))}
                        </span>
                    </div>
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Lucro Líquido"</h3>
                        <p class="stat-card-value">{move || format_currency(stats.with(|s| s.summary.profit))}</p>
                        <span class="stat-card-subtext">"Lucro após despesas"</span>
                    </div>
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Valor em Estoque"</h3>
                        <p class="stat-card-value">
                            {move || format_currency(stats.with(|s| s.materials.total_stock_value))}
                        </p>
                        <span class="stat-card-subtext">
                            {move || {
                                let withdrawn = stats.with(|s| s.materials.total_withdrawals_value);
                                if withdrawn > 0.0 {
                                    format!("Retirado: {}", format_currency(withdrawn))
                                } else {
                                    "Valor atual do estoque".to_string()
                                }
                            }}
                        </span>
                    </div>
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Vendas Pendentes"</h3>
                        <p class="stat-card-value">{move || stats.with(|s| s.summary.pending_count)}</p>
                        <span class="stat-card-subtext">
                            {move || format!("{} a receber", format_currency(stats.with(|s| s.summary.pending_amount)))}
                        </span>
                    </div>
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Produtos Cadastrados"</h3>
                        <p class="stat-card-value">{move || stats.with(|s| s.total_products)}</p>
                    </div>
                    <div class="stat-card">
                        <h3 class="stat-card-title">"Materiais"</h3>
                        <p class="stat-card-value">{move || stats.with(|s| s.materials.total_materials)}</p>
                        <span class="stat-card-subtext">
                            {move || format!("{} com estoque baixo", stats.with(|s| s.materials.low_stock_count))}
                        </span>
                    </div>
                </div>

                <div class="dashboard-section">
                    <div class="dashboard-section-header">
                        <h2>"Histórico de Transações"</h2>
                    </div>
                    <Show
                        when=move || !recent.with(Vec::is_empty)
                        fallback=|| view! { <p class="no-transactions">"Nenhuma transação recente"</p> }
                    >
                        <table class="transactions-table">
                            <thead>
                                <tr>
                                    <th>"Nome"</th>
                                    <th>"Tipo"</th>
                                    <th>"Data"</th>
                                    <th>"Valor"</th>
                                    <th>"Status"</th>
                                </tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || recent.get()
                                    key=|sale| sale.id.clone()
                                    children=move |sale| {
                                        view! {
                                            <tr>
                                                <td class="transaction-name">
                                                    {ref_name(&sale.client).unwrap_or("Venda sem cliente").to_string()}
                                                </td>
                                                <td>{sale.payment_method.map(|m| m.label()).unwrap_or("N/A")}</td>
                                                <td>{format_opt_date(sale.sale_date.as_deref())}</td>
                                                <td class="transaction-value">{format_currency(sale.total_amount)}</td>
                                                <td>
                                                    <span class=format!("status-badge status-{}", sale.payment_status.as_str())>
                                                        {status_label(&sale)}
                                                    </span>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </Show>
                </div>
            </div>
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    #[test]
    fn test_stale_or_unmounted_fetch_is_dropped() {
        let owner = Owner::new();
        let generation = owner.with(|| StoredValue::new(2u64));
        assert!(is_latest(generation, 2));
        assert!(!is_latest(generation, 1));

        drop(owner);
        assert!(!is_latest(generation, 2));
    }
}
