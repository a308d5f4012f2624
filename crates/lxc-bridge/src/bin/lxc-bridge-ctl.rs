// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! LXC Bridge Control CLI
//!
//! Panel-facing command line surface for the bridge. Every command prints
//! the JSON value handed back to the panel on stdout.
//!
//! Usage:
//!   lxc-bridge-ctl <command> --host-id <id> [options]
//!
//! Commands:
//!   provision | suspend | resume | terminate | renew | change-plan
//!   power-on | power-off | reboot
//!   reinstall | rescue | reset-password | console | usage-update | charts | tickets
//!   sync | status
//!   exec | add-nat-rule | delete-nat-rule | list-nat-rules
//!   tab <info|nat|exec>
//!   metadata

use std::io;
use std::process::ExitCode;

use lxc_bridge::{
    BillingContext, Bridge, EndUserAction, LifecycleAction, MiniJinjaRenderer, PanelOutcome,
    ProductOptions, RequestParams, Role, Tab, UnsupportedOperation, config_options,
    module_metadata,
};
use serde_json::json;

fn print_usage() {
    eprintln!(
        r#"Usage: lxc-bridge-ctl <command> --host-id <id> [options]

Drive the remote LXC container service the way the billing panel does.

LIFECYCLE COMMANDS:
    provision                       Create the container (requires --image)
    suspend                         Stop the container
    resume                          Start the container
    terminate                       Delete the container
    renew                           Acknowledge a renewal (no remote call)
    change-plan                     Report a plan change (no remote call)
    power-on | power-off | reboot   Power actions

NOT IMPLEMENTED BY THE SERVICE:
    reinstall, rescue, reset-password, console, usage-update, charts, tickets

STATE COMMANDS:
    sync                            Reconcile lifecycle status and IP
    status                          UI status flag and description

END-USER COMMANDS:
    exec --command <cmd>            Run a command in the container
    add-nat-rule --host-port <p> --container-port <p> --protocol <tcp|udp>
    delete-nat-rule --rule-id <id>
    list-nat-rules                  List port forwarding rules

PRESENTATION:
    tab <info|nat|exec>             Render a client-area tab as HTML
    metadata                        Print module metadata and product options

CONTEXT OPTIONS:
    --host-id <id>                  Hosting account ID (required)
    --product-id <id>               Product ID (default: 0)
    --user-id <id>                  Client user ID (default: 0)
    --image <image>                 Product image, e.g. ubuntu/22.04
    --template <template>           Name template (default: whmcs-{{hostid}})
    --previous-image <image>        Image before a plan change
    --role <client|admin>           Role for end-user commands (default: client)

ENVIRONMENT:
    LXC_BRIDGE_BASE_URL             Remote service base URL (required)
    LXC_BRIDGE_API_KEY              Bearer key
    LXC_BRIDGE_VERIFY_TLS           Verify TLS certificates (default: false)
    LXC_BRIDGE_LOCALE               en | zh-CN (default: en)
    LXC_BRIDGE_AUDIT_LOG            Append audit records to this JSON-lines file

EXAMPLES:
    # Provision a container for hosting account 101
    lxc-bridge-ctl provision --host-id 101 --image ubuntu/20.04

    # Forward host port 2222 to ssh
    lxc-bridge-ctl add-nat-rule --host-id 101 --host-port 2222 --container-port 22 --protocol tcp
"#
    );
}

#[derive(Debug)]
enum Command {
    Lifecycle {
        action: LifecycleAction,
        context: BillingContext,
    },
    Unsupported {
        operation: UnsupportedOperation,
    },
    Sync {
        context: BillingContext,
    },
    Status {
        context: BillingContext,
    },
    EndUser {
        role: Role,
        action: EndUserAction,
        context: BillingContext,
    },
    ListNatRules {
        context: BillingContext,
    },
    Tab {
        tab: Tab,
        context: BillingContext,
    },
    Metadata,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_from_vec(&args)
}

fn parse_args_from_vec(args: &[String]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    match args[1].as_str() {
        "help" | "--help" | "-h" => {
            print_usage();
            std::process::exit(0);
        }
        "metadata" => Ok(Command::Metadata),
        "sync" => Ok(Command::Sync {
            context: parse_context(&args[2..])?.context,
        }),
        "status" => Ok(Command::Status {
            context: parse_context(&args[2..])?.context,
        }),
        "list-nat-rules" => Ok(Command::ListNatRules {
            context: parse_context(&args[2..])?.context,
        }),
        "exec" | "add-nat-rule" | "delete-nat-rule" => {
            let action = match args[1].as_str() {
                "exec" => EndUserAction::ExecCommand,
                "add-nat-rule" => EndUserAction::AddNatRule,
                _ => EndUserAction::DeleteNatRule,
            };
            let parsed = parse_context(&args[2..])?;
            Ok(Command::EndUser {
                role: parsed.role,
                action,
                context: parsed.context,
            })
        }
        "tab" => {
            let tab: Tab = args.get(2).ok_or("Tab name required")?.parse()?;
            Ok(Command::Tab {
                tab,
                context: parse_context(&args[3..])?.context,
            })
        }
        cmd => {
            if let Ok(action) = cmd.parse::<LifecycleAction>() {
                return Ok(Command::Lifecycle {
                    action,
                    context: parse_context(&args[2..])?.context,
                });
            }
            if let Ok(operation) = cmd.parse::<UnsupportedOperation>() {
                return Ok(Command::Unsupported { operation });
            }
            Err(format!("Unknown command: {}", cmd))
        }
    }
}

#[derive(Debug)]
struct ParsedContext {
    role: Role,
    context: BillingContext,
}

fn parse_context(args: &[String]) -> Result<ParsedContext, String> {
    let mut host_id: Option<u64> = None;
    let mut product_id: u64 = 0;
    let mut user_id: u64 = 0;
    let mut options = ProductOptions::new();
    let mut previous_image: Option<String> = None;
    let mut params = RequestParams::default();
    let mut role = Role::Client;

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = || {
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{} requires a value", flag))
        };
        match flag {
            "--host-id" => host_id = Some(value()?.parse().map_err(|_| "Invalid host ID")?),
            "--product-id" => product_id = value()?.parse().map_err(|_| "Invalid product ID")?,
            "--user-id" => user_id = value()?.parse().map_err(|_| "Invalid user ID")?,
            "--image" => options = options.with_image(value()?),
            "--template" => options = options.with_name_template(value()?),
            "--previous-image" => previous_image = Some(value()?),
            "--command" => params.command = Some(value()?),
            "--host-port" => params.host_port = Some(value()?),
            "--container-port" => params.container_port = Some(value()?),
            "--protocol" => params.protocol = Some(value()?),
            "--rule-id" => params.rule_id = Some(value()?),
            "--role" => {
                role = match value()?.as_str() {
                    "client" => Role::Client,
                    "admin" => Role::Admin,
                    other => return Err(format!("Invalid role: {}", other)),
                }
            }
            arg => return Err(format!("Unknown argument: {}", arg)),
        }
        i += 1;
    }

    let mut context = BillingContext::new(host_id.ok_or("--host-id is required")?)
        .with_product_id(product_id)
        .with_user_id(user_id)
        .with_options(options)
        .with_params(params);
    if let Some(image) = previous_image {
        context = context.with_previous_options(ProductOptions::new().with_image(image));
    }

    Ok(ParsedContext { role, context })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lxc_bridge=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    dotenvy::dotenv().ok();

    let cmd = match parse_args() {
        Ok(cmd) => cmd,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    if let Command::Metadata = cmd {
        return print_json(&json!({
            "metadata": module_metadata(),
            "config_options": config_options(),
        }));
    }

    let bridge = match Bridge::from_env() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    execute_command(&bridge, cmd)
}

fn execute_command(bridge: &Bridge, cmd: Command) -> ExitCode {
    match cmd {
        Command::Lifecycle { action, context } => print_outcome(&bridge.dispatch(action, &context)),
        Command::Unsupported { operation } => print_outcome(&bridge.unsupported(operation)),
        Command::Sync { context } => match bridge.sync(&context) {
            Ok(result) => print_json(&result),
            Err(e) => print_outcome(&PanelOutcome::Error(e.panel_message(bridge.locale()))),
        },
        Command::Status { context } => print_json(&bridge.probe_status(&context)),
        Command::EndUser {
            role,
            action,
            context,
        } => print_outcome(&bridge.perform(role, action, &context)),
        Command::ListNatRules { context } => match bridge.list_nat_rules(&context) {
            Ok(rules) => print_json(&rules),
            Err(e) => print_outcome(&PanelOutcome::Error(e.panel_message(bridge.locale()))),
        },
        Command::Tab { tab, context } => {
            let renderer = match MiniJinjaRenderer::new() {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            println!("{}", bridge.render_tab(tab, &context, &renderer));
            ExitCode::SUCCESS
        }
        Command::Metadata => print_json(&json!({
            "metadata": module_metadata(),
            "config_options": config_options(),
        })),
    }
}

fn print_outcome(outcome: &PanelOutcome) -> ExitCode {
    let code = print_json(outcome);
    if outcome.is_success() { code } else { ExitCode::FAILURE }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(s) => {
            println!("{}", s);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
