//! 终端命令处理
//!
//! 从标准输入逐行读取命令，转换为视图切换、调度器控制或动作分发。
//! 动作命令在分发器内部经过阻塞式确认后才会发出请求。

use std::io::Write;
use std::sync::Arc;

use tokio::sync::mpsc;

use client::actions::{Action, ActionDispatch, ActionDispatcher, ActionTarget, Confirm};
use client::scheduler::RefreshScheduler;
use client::session::SessionStore;
use client::store::TopologyStore;

/// 阻塞式确认提示，浏览器 confirm() 对话框的终端等价物
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{prompt} [y/N] ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(_) => matches!(line.trim(), "y" | "Y" | "yes"),
            Err(_) => false,
        }
    }
}

/// 命令循环持有的组件
pub struct CommandLoop {
    pub store: Arc<TopologyStore>,
    pub scheduler: Arc<RefreshScheduler>,
    pub session: Arc<SessionStore>,
    pub dispatcher: ActionDispatcher,
}

impl CommandLoop {
    /// 启动命令循环；标准输入关闭时静默结束，quit 命令通过信号通道上报
    pub fn spawn(self, quit_tx: mpsc::Sender<()>) {
        tokio::spawn(async move {
            loop {
                let Some(line) = read_line().await else {
                    break;
                };
                let line = line.trim().to_string();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    let _ = quit_tx.send(()).await;
                    break;
                }
                self.handle(&line).await;
            }
        });
    }

    async fn handle(&self, line: &str) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["help"] => print_help(),
            ["select", name] => self.store.select_cluster(name),
            ["close"] => self.store.close_cluster(),
            ["pause"] => self.scheduler.set_paused(true).await,
            ["resume"] => {
                self.scheduler.set_paused(false).await;
                self.scheduler.start().await;
            }
            ["interval", seconds] => match seconds.parse() {
                Ok(seconds) => {
                    let applied = self.scheduler.set_interval(seconds).await;
                    println!("refresh interval: {applied}s");
                }
                Err(_) => println!("usage: interval <seconds>"),
            },
            ["refresh"] => self.scheduler.tick().await,
            ["logout"] => self.session.logout().await,
            ["switchover", cluster] => {
                self.run_action(Action::Switchover, ActionTarget::cluster(*cluster))
                    .await
            }
            ["failover", cluster] => {
                self.run_action(Action::Failover, ActionTarget::cluster(*cluster))
                    .await
            }
            ["failover", cluster, id] => match id.parse() {
                Ok(id) => {
                    self.run_action(Action::Failover, ActionTarget::server(*cluster, id))
                        .await
                }
                Err(_) => println!("usage: failover <cluster> [server-id]"),
            },
            ["rolling", cluster] => {
                self.run_action(Action::RollingRestart, ActionTarget::cluster(*cluster))
                    .await
            }
            _ => println!("unknown command, try 'help'"),
        }
    }

    async fn run_action(&self, action: Action, target: ActionTarget) {
        if let Err(err) = self.dispatcher.dispatch(action, target).await {
            println!("{err}");
        }
    }
}

/// 读取一行标准输入；EOF 或读取失败返回 None
async fn read_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}

fn print_help() {
    println!(
        "commands:\n  \
         select <cluster>        switch to a cluster view\n  \
         close                   back to the overview\n  \
         pause | resume          control polling\n  \
         interval <seconds>      set the refresh cadence (2-600)\n  \
         refresh                 force one poll tick\n  \
         switchover <cluster>    planned master switchover\n  \
         failover <cluster> [id] forced failover\n  \
         rolling <cluster>       rolling restart\n  \
         logout | quit"
    );
}
