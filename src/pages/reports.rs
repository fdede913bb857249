//! Reports Page
//!
//! Sales statistics for a closed period.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api;
use crate::calc::{average_ticket, format_currency, format_opt_date, margin};
use crate::context::use_app;
use crate::forms::require_range;
use crate::models::{ref_name, SalesReport};

use super::fields::date_input;

#[component]
pub fn ReportsPage() -> impl IntoView {
    let ctx = use_app();
    let start = RwSignal::new(String::new());
    let end = RwSignal::new(String::new());
    let (report, set_report) = signal(None::<SalesReport>);
    let (generating, set_generating) = signal(false);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let (start, end) = match require_range(&start.get_untracked(), &end.get_untracked()) {
            Ok(range) => range,
            Err(err) => return ctx.toasts.error(err.to_string()),
        };
        set_generating.set(true);
        spawn_local(async move {
            let start = start.format("%Y-%m-%d").to_string();
            let end = end.format("%Y-%m-%d").to_string();
            match api::sales_report(&ctx.api(), &start, &end).await {
                Ok(data) => {
                    set_report.set(Some(data));
                    ctx.toasts.success("Relatório gerado com sucesso!");
                }
                Err(err) => ctx.report(&err, "Erro ao gerar relatório"),
            }
            set_generating.set(false);
        });
    };

    view! {
        <div class="reports-page">
            <h1>"Relatórios"</h1>

            <div class="report-form-container">
                <form class="report-form" on:submit=on_submit>
                    {date_input("Data Inicial *", start)}
                    {date_input("Data Final *", end)}
                    <button type="submit" class="btn-primary" disabled=move || generating.get()>
                        {move || if generating.get() { "Gerando..." } else { "Gerar Relatório" }}
                    </button>
                </form>
            </div>

            {move || report.get().map(|report| {
                let stats = report.statistics;
                view! {
                    <div class="report-results">
                        <div class="report-period-info">
                            <h2>"Relatório do Período"</h2>
                            <p class="period-dates">
                                {format_opt_date(report.period.start_date.as_deref())}
                                " até "
                                {format_opt_date(report.period.end_date.as_deref())}
                            </p>
                        </div>

                        <div class="stats-grid">
                            <div class="reports-stat-card">
                                <h3>"Total de Vendas"</h3>
                                <p class="reports-stat-value">{stats.total_sales}</p>
                            </div>
                            <div class="reports-stat-card">
                                <h3>"Receita Total"</h3>
                                <p class="reports-stat-value">{format_currency(stats.total_amount)}</p>
                            </div>
                            <div class="reports-stat-card">
                                <h3>"Custo Total"</h3>
                                <p class="reports-stat-value">{format_currency(stats.total_cost)}</p>
                            </div>
                            <div class="reports-stat-card">
                                <h3>"Lucro Bruto"</h3>
                                <p class="reports-stat-value profit">{format_currency(stats.total_gross_profit)}</p>
                                {margin(stats.total_gross_profit, stats.total_amount).map(|m| view! {
                                    <small class="profit-margin">{format!("Margem: {m}%")}</small>
                                })}
                            </div>
                            <div class="reports-stat-card">
                                <h3>"Lucro Líquido"</h3>
                                <p class="reports-stat-value profit">{format_currency(stats.total_net_profit)}</p>
                                {margin(stats.total_net_profit, stats.total_amount).map(|m| view! {
                                    <small class="profit-margin">{format!("Margem: {m}%")}</small>
                                })}
                            </div>
                            {average_ticket(stats.total_amount, stats.total_sales).map(|ticket| view! {
                                <div class="reports-stat-card">
                                    <h3>"Ticket Médio"</h3>
                                    <p class="reports-stat-value">{format_currency(ticket)}</p>
                                </div>
                            })}
                        </div>

                        <div class="report-sales">
                            <h3>"Vendas do Período"</h3>
                            <table class="data-table">
                                <thead>
                                    <tr>
                                        <th>"Data"</th>
                                        <th>"Cliente"</th>
                                        <th>"Valor Total"</th>
                                        <th>"Lucro Líquido"</th>
                                    </tr>
                                </thead>
                                <tbody>
                                    {if report.sales.is_empty() {
                                        view! {
                                            <tr><td colspan="4" class="empty-state">"Nenhuma venda no período"</td></tr>
                                        }.into_any()
                                    } else {
                                        report.sales.iter().map(|sale| view! {
                                            <tr>
                                                <td>{format_opt_date(sale.sale_date.as_deref())}</td>
                                                <td>{ref_name(&sale.client).unwrap_or("N/A").to_string()}</td>
                                                <td>{format_currency(sale.total_amount)}</td>
                                                <td>{format_currency(sale.net_profit)}</td>
                                            </tr>
                                        }).collect_view().into_any()
                                    }}
                                </tbody>
                            </table>
                        </div>
                    </div>
                }
            })}
        </div>
    }
}
