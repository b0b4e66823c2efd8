//! 激活器抽象接口
//!
//! 激活器是"给定已解析的依赖，产出一个服务实例"的工厂。注册表只保存
//! 类型擦除后的 [`Activator`]，具体的闭包通过 [`IntoActivator`] 和
//! [`IntoFallibleActivator`] 在注册时包装，参数类型和返回类型在这一刻确定。

use di_common::{ActivationError, DependencyError, Instance, ServiceType};
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// 激活器 trait
///
/// 调用方保证 `invoke` 收到的参数与 `parameter_types` 一一对应、顺序一致。
pub trait Activator: Send + Sync {
    /// 产出的服务类型
    fn service_type(&self) -> ServiceType;

    /// 声明的依赖类型，按参数顺序排列
    fn parameter_types(&self) -> &[ServiceType];

    /// 激活器身份，用于同一服务类型下的重复检测
    ///
    /// 返回 `None` 的激活器永远不会被视为重复。
    fn identity(&self) -> Option<TypeId> {
        None
    }

    /// 使用已解析的参数实例创建服务实例
    fn invoke(&self, arguments: &[Instance]) -> Result<Instance, ActivationError>;
}

impl fmt::Debug for dyn Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator")
            .field("service_type", &self.service_type())
            .field("parameter_types", &self.parameter_types())
            .finish()
    }
}

/// 可以转换为激活器的函数
///
/// 为参数个数 0 到 8 的 `Fn(A1, .., An) -> T` 实现。
pub trait IntoActivator<Args>: Send + Sync + 'static {
    /// 产出的服务类型
    type Service: Send + Sync + 'static;

    /// 包装为类型擦除的激活器
    fn into_activator(self) -> Arc<dyn Activator>;
}

/// 可以转换为激活器的可失败函数
///
/// 为参数个数 0 到 8 的 `Fn(A1, .., An) -> Result<T, E>` 实现。
pub trait IntoFallibleActivator<Args>: Send + Sync + 'static {
    /// 产出的服务类型
    type Service: Send + Sync + 'static;

    /// 包装为类型擦除的激活器
    fn into_activator(self) -> Arc<dyn Activator>;
}

/// 函数激活器
pub struct FnActivator<F, Args> {
    func: F,
    parameter_types: Vec<ServiceType>,
    _args: PhantomData<fn() -> Args>,
}

/// 可失败函数激活器
pub struct FallibleFnActivator<F, Args> {
    func: F,
    parameter_types: Vec<ServiceType>,
    _args: PhantomData<fn() -> Args>,
}

/// 预构建实例激活器
///
/// 每次调用都返回同一个实例，没有依赖，也没有身份。
pub struct InstanceActivator {
    service_type: ServiceType,
    instance: Instance,
}

impl InstanceActivator {
    /// 包装一个已经构建好的值
    pub fn new<T>(value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            service_type: ServiceType::of::<T>(),
            instance: Arc::new(value),
        }
    }
}

impl Activator for InstanceActivator {
    fn service_type(&self) -> ServiceType {
        self.service_type
    }

    fn parameter_types(&self) -> &[ServiceType] {
        &[]
    }

    fn invoke(&self, _arguments: &[Instance]) -> Result<Instance, ActivationError> {
        Ok(self.instance.clone())
    }
}

/// 从参数列表中取出一个类型化的参数
fn argument<A>(argument: Option<&Instance>) -> Result<A, ActivationError>
where
    A: Clone + 'static,
{
    let instance = argument.ok_or_else(|| DependencyError::InstanceTypeMismatch {
        expected: std::any::type_name::<A>().to_string(),
        actual: "<missing>".to_string(),
    })?;

    (**instance).downcast_ref::<A>().cloned().ok_or_else(|| {
        DependencyError::InstanceTypeMismatch {
            expected: std::any::type_name::<A>().to_string(),
            actual: "<other>".to_string(),
        }
        .into()
    })
}

macro_rules! impl_activator_fn {
    ($($param:ident),*) => {
        impl<F, T, $($param,)*> Activator for FnActivator<F, ($($param,)*)>
        where
            F: Fn($($param),*) -> T + Send + Sync + 'static,
            T: Send + Sync + 'static,
            $($param: Clone + Send + Sync + 'static,)*
        {
            fn service_type(&self) -> ServiceType {
                ServiceType::of::<T>()
            }

            fn parameter_types(&self) -> &[ServiceType] {
                &self.parameter_types
            }

            fn identity(&self) -> Option<TypeId> {
                Some(TypeId::of::<F>())
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn invoke(&self, arguments: &[Instance]) -> Result<Instance, ActivationError> {
                let mut arguments = arguments.iter();
                $(let $param = argument::<$param>(arguments.next())?;)*
                Ok(Arc::new((self.func)($($param),*)))
            }
        }

        impl<F, T, $($param,)*> IntoActivator<($($param,)*)> for F
        where
            F: Fn($($param),*) -> T + Send + Sync + 'static,
            T: Send + Sync + 'static,
            $($param: Clone + Send + Sync + 'static,)*
        {
            type Service = T;

            fn into_activator(self) -> Arc<dyn Activator> {
                Arc::new(FnActivator::<F, ($($param,)*)> {
                    func: self,
                    parameter_types: vec![$(ServiceType::of::<$param>()),*],
                    _args: PhantomData,
                })
            }
        }

        impl<F, T, E, $($param,)*> Activator for FallibleFnActivator<F, ($($param,)*)>
        where
            F: Fn($($param),*) -> Result<T, E> + Send + Sync + 'static,
            T: Send + Sync + 'static,
            E: Into<ActivationError> + 'static,
            $($param: Clone + Send + Sync + 'static,)*
        {
            fn service_type(&self) -> ServiceType {
                ServiceType::of::<T>()
            }

            fn parameter_types(&self) -> &[ServiceType] {
                &self.parameter_types
            }

            fn identity(&self) -> Option<TypeId> {
                Some(TypeId::of::<F>())
            }

            #[allow(non_snake_case, unused_variables, unused_mut)]
            fn invoke(&self, arguments: &[Instance]) -> Result<Instance, ActivationError> {
                let mut arguments = arguments.iter();
                $(let $param = argument::<$param>(arguments.next())?;)*
                let value = (self.func)($($param),*).map_err(Into::into)?;
                Ok(Arc::new(value))
            }
        }

        impl<F, T, E, $($param,)*> IntoFallibleActivator<($($param,)*)> for F
        where
            F: Fn($($param),*) -> Result<T, E> + Send + Sync + 'static,
            T: Send + Sync + 'static,
            E: Into<ActivationError> + 'static,
            $($param: Clone + Send + Sync + 'static,)*
        {
            type Service = T;

            fn into_activator(self) -> Arc<dyn Activator> {
                Arc::new(FallibleFnActivator::<F, ($($param,)*)> {
                    func: self,
                    parameter_types: vec![$(ServiceType::of::<$param>()),*],
                    _args: PhantomData,
                })
            }
        }
    };
}

impl_activator_fn!();
impl_activator_fn!(A1);
impl_activator_fn!(A1, A2);
impl_activator_fn!(A1, A2, A3);
impl_activator_fn!(A1, A2, A3, A4);
impl_activator_fn!(A1, A2, A3, A4, A5);
impl_activator_fn!(A1, A2, A3, A4, A5, A6);
impl_activator_fn!(A1, A2, A3, A4, A5, A6, A7);
impl_activator_fn!(A1, A2, A3, A4, A5, A6, A7, A8);
