use fluent_inject::{
    dsl::{prelude::*, BindingScope},
    implements, named, only, Annotation, BindingErrorKind, BindingInfo, ConstantBindingErrorKind, DependencyResolver, Inject,
    InjectWith, Injectable, Injector, InstantiateErrorKind, Key, MethodInvocation, MethodResult, ProvisionInvocation,
    ProvisionListener, Singleton, SingletonScope, TypeEncounter, TypeInfo, TypeLiteral,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct SomeAnnotation;

impl Annotation for SomeAnnotation {}

trait ServiceInterface: Send + Sync {
    fn name(&self) -> &'static str;
}

struct ServiceImpl;

impl ServiceInterface for ServiceImpl {
    fn name(&self) -> &'static str {
        "service"
    }
}

impl Injectable for ServiceImpl {
    type Deps = ();

    fn construct((): ()) -> Result<Self, InstantiateErrorKind> {
        Ok(Self)
    }
}

implements!(ServiceImpl => dyn ServiceInterface);

trait Foo: Send + Sync {}

struct Bar;

impl Foo for Bar {}

impl Injectable for Bar {
    type Deps = ();

    fn construct((): ()) -> Result<Self, InstantiateErrorKind> {
        Ok(Self)
    }
}

implements!(Bar => dyn Foo);

struct Consumer {
    service: Arc<dyn ServiceInterface>,
}

impl Injectable for Consumer {
    type Deps = (Inject<dyn ServiceInterface>,);

    fn construct((Inject(service),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self { service })
    }
}

#[test]
fn test_interface_to_implementation() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.ty::<dyn ServiceInterface>().to::<ServiceImpl>();
            b.injectable::<Consumer>();
        });
    }))
    .unwrap();

    assert_eq!(injector.get::<dyn ServiceInterface>().unwrap().name(), "service");
    assert_eq!(injector.get::<Consumer>().unwrap().service.name(), "service");
    // Unscoped bindings provide a new instance every time
    assert!(!Arc::ptr_eq(
        &injector.get::<dyn ServiceInterface>().unwrap(),
        &injector.get::<dyn ServiceInterface>().unwrap()
    ));
}

#[test]
fn test_annotated_constants() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.constant().annotated_with_type::<SomeAnnotation>().to(42).unwrap();
            b.constant().annotated_with(named("host")).to("localhost").unwrap();
            b.constant().annotated_with(named("type")).to_type::<Bar>().unwrap();
        });
    }))
    .unwrap();

    assert_eq!(*injector.get_key(&Key::<i32>::annotated_with::<SomeAnnotation>()).unwrap(), 42);
    assert_eq!(*injector.get_key(&Key::<String>::annotated(named("host"))).unwrap(), "localhost");
    assert_eq!(*injector.get_key(&Key::<TypeInfo>::annotated(named("type"))).unwrap(), TypeInfo::of::<Bar>());
    assert!(injector.get::<i32>().is_err());
}

#[test]
fn test_constant_without_annotation() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            assert_eq!(b.constant().to(42), Err(ConstantBindingErrorKind::MissingAnnotation));
            assert_eq!(b.constant().to_enum(Ordering::SeqCst), Err(ConstantBindingErrorKind::MissingAnnotation));
        });
    }))
    .unwrap();

    assert_eq!(injector.bindings().count(), 0);
}

#[test]
fn test_scoped_contexts_share_instance() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.scope_annotated::<Singleton>(|b| {
                b.ty::<dyn Foo>().to::<Bar>();
            });
            b.scope(SingletonScope, |b| {
                b.ty::<dyn ServiceInterface>().to::<ServiceImpl>();
            });
        });
    }))
    .unwrap();

    assert!(Arc::ptr_eq(&injector.get::<dyn Foo>().unwrap(), &injector.get::<dyn Foo>().unwrap()));
    assert!(Arc::ptr_eq(
        &injector.get::<dyn ServiceInterface>().unwrap(),
        &injector.get::<dyn ServiceInterface>().unwrap()
    ));
}

#[test]
fn test_instances_are_never_scoped() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.scope_annotated::<SomeAnnotation>(|b| {
                b.ty::<String>().to_instance(String::from("instance"));
            });
        });
    }))
    .unwrap();

    // The scope annotation isn't bound, so any scoped binding would fail the creation
    assert_eq!(*injector.get::<String>().unwrap(), "instance");
}

#[test]
fn test_unbound_scope_annotation() {
    let err = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.scope_annotated::<SomeAnnotation>(|b| {
                b.ty::<dyn Foo>().to::<Bar>();
            });
        });
    }))
    .unwrap_err();

    assert!(matches!(err.errors.as_slice(), [BindingErrorKind::ScopeNotBound { .. }]));
}

#[test]
fn test_custom_scope_annotation() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.scope_annotation::<SomeAnnotation>().to(SingletonScope);
            b.scope_annotated::<SomeAnnotation>(|b| {
                b.ty_literal(TypeLiteral::<Vec<u8>>::new()).to_provider_fn(|| vec![1_u8, 2]);
            });
        });
    }))
    .unwrap();

    let first = injector.get::<Vec<u8>>().unwrap();

    assert_eq!(*first, [1, 2]);
    assert!(Arc::ptr_eq(&first, &injector.get::<Vec<u8>>().unwrap()));
}

#[test]
fn test_last_annotation_wins() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.ty::<dyn Foo>()
                .annotated_with(named("first"))
                .annotated_with_type::<SomeAnnotation>()
                .to::<Bar>();
            b.constant()
                .annotated_with_type::<SomeAnnotation>()
                .annotated_with(named("port"))
                .to(8080_u16)
                .unwrap();
        });
    }))
    .unwrap();

    assert!(injector.get_key(&Key::<dyn Foo>::annotated_with::<SomeAnnotation>()).is_ok());
    assert!(injector.get_key(&Key::<dyn Foo>::annotated(named("first"))).is_err());
    assert_eq!(*injector.get_key(&Key::<u16>::annotated(named("port"))).unwrap(), 8080);
}

struct Retries(i32);

impl Injectable for Retries {
    type Deps = (InjectWith<i32, SomeAnnotation>,);

    fn construct((InjectWith(retries, _),): Self::Deps) -> Result<Self, InstantiateErrorKind> {
        Ok(Self(*retries))
    }
}

#[test]
fn test_marker_annotation_instance_is_annotation_type() {
    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| {
            b.constant().annotated_with(SomeAnnotation).to(42_i32).unwrap();
            b.ty::<dyn Foo>().annotated_with(SomeAnnotation).to::<Bar>();
            b.injectable::<Retries>();
        });
    }))
    .unwrap();

    assert_eq!(*injector.get_key(&Key::<i32>::annotated_with::<SomeAnnotation>()).unwrap(), 42);
    assert_eq!(*injector.get_key(&Key::<i32>::annotated(SomeAnnotation)).unwrap(), 42);
    assert!(injector.get_key(&Key::<dyn Foo>::annotated_with::<SomeAnnotation>()).is_ok());

    let Ok(InjectWith(retries, _)) = <InjectWith<i32, SomeAnnotation>>::resolve(&injector) else {
        panic!("annotated constant should be resolved");
    };
    assert_eq!(*retries, 42);
    assert_eq!(injector.get::<Retries>().unwrap().0, 42);
}

#[test]
fn test_nested_context_as_function() {
    fn services(b: &mut BindingScope<'_>) {
        b.ty::<dyn ServiceInterface>().to::<ServiceImpl>();
        b.ty_key(Key::<dyn Foo>::annotated(named("foo"))).to::<Bar>();
    }

    let injector = Injector::create(&module(|binder| {
        binder.bindings(|b| b.scope_annotated::<Singleton>(services));
    }))
    .unwrap();

    let foo = injector.get_key(&Key::<dyn Foo>::annotated(named("foo"))).unwrap();
    assert!(Arc::ptr_eq(&foo, &injector.get_key(&Key::<dyn Foo>::annotated(named("foo"))).unwrap()));
}

#[test]
fn test_listeners() {
    let constructed = Arc::new(AtomicUsize::new(0));
    let provisions = Arc::new(Mutex::new(Vec::new()));

    let injector = Injector::create(&module({
        let constructed = constructed.clone();
        let provisions = provisions.clone();
        move |binder| {
            binder.bindings(|b| {
                b.scope_annotated::<Singleton>(|b| {
                    b.ty::<dyn Foo>().to::<Bar>();
                });
            });

            let constructed = constructed.clone();
            binder.type_listener_matching(only(TypeInfo::of::<Bar>()), move |_: TypeInfo, encounter: &mut TypeEncounter| {
                let constructed = constructed.clone();
                encounter.register_injection_listener(move |_: &Bar| {
                    constructed.fetch_add(1, Ordering::SeqCst);
                });
            });

            let provisions = provisions.clone();
            let listener: Arc<dyn ProvisionListener> = Arc::new(move |invocation: &mut ProvisionInvocation<'_>| {
                provisions.lock().unwrap().push(invocation.binding().key.to_string());
            });
            binder.provision_listeners_matching(|binding: &BindingInfo| binding.scope.is_some(), [listener]);
        }
    }))
    .unwrap();

    injector.get::<dyn Foo>().unwrap();
    injector.get::<dyn Foo>().unwrap();

    assert_eq!(constructed.load(Ordering::SeqCst), 1);
    // Only the scoped binding is listened to, and its cached instance is returned without a provision
    assert_eq!(provisions.lock().unwrap().len(), 1);
}

#[test]
fn test_interceptors() {
    let injector = Injector::create(&module(|binder| {
        binder.intercept_matching(
            only(TypeInfo::of::<dyn ServiceInterface>()),
            |method: &str| method == "name",
            |invocation: &mut MethodInvocation<'_>| {
                let name = invocation.proceed_as::<&'static str>()?;
                Ok(Box::new(if name == "service" { "intercepted" } else { name }) as MethodResult)
            },
        );
        binder.bindings(|b| {
            b.ty::<dyn ServiceInterface>().to::<ServiceImpl>();
        });
    }))
    .unwrap();

    let service = injector.get::<dyn ServiceInterface>().unwrap();

    assert_eq!(
        injector.intercept::<dyn ServiceInterface, _>("name", || service.name()).unwrap(),
        "intercepted"
    );
    assert_eq!(injector.intercept::<Bar, _>("name", || service.name()).unwrap(), "service");
}
