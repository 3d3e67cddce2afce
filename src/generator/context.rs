use anyhow::Result;

use crate::config::Config;
use crate::generator::agent::Agent;
use crate::generator::persona::Persona;
use crate::llm::router::ModelRouter;
use crate::llm::tools::Toolbox;

#[derive(Clone)]
pub struct GeneratorContext {
    /// 模型路由器，所有智能体共享
    pub router: ModelRouter,
    /// 配置
    pub config: Config,
    /// 工具集合
    pub toolbox: Toolbox,
}

impl GeneratorContext {
    /// 创建新的生成器上下文
    pub fn new(config: Config) -> Result<Self> {
        let router = ModelRouter::from_config(&config)?;
        Self::with_router(config, router)
    }

    /// 使用指定的路由器创建上下文
    pub fn with_router(config: Config, router: ModelRouter) -> Result<Self> {
        let toolbox = Toolbox::new(&config)?;
        Ok(Self {
            router,
            config,
            toolbox,
        })
    }

    pub fn build_agent(&self, persona: Persona) -> Agent {
        Agent::new(persona, self.router.clone(), self.toolbox.clone())
    }

    /// 按执行顺序创建四个标准智能体，日志写入 `logs/agents`
    pub fn standard_agents(&self) -> Vec<Agent> {
        let logs_dir = self.config.agent_logs_dir();
        Persona::standard_crew(Some(logs_dir.as_path()))
            .into_iter()
            .map(|persona| self.build_agent(persona))
            .collect()
    }
}
